// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! The roster of checksum and hash functions under test.
//!
//! Every algorithm is adapted to the harness plugin signature
//! `(bytes) -> u64`: 32-bit checksums widen, wide digests truncate to
//! their leading 8 bytes. The harness itself never looks inside these
//! closures.

use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use std::io::Cursor;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use xxhash_rust::xxh32::xxh32;
use xxhash_rust::xxh64::xxh64;

use hashmark_core::{BenchmarkRegistry, ConfigError};

/// Seed applied to the seeded fast hashes, shared across widths so their
/// results stay comparable between runs.
const XXHASH_SEED: u32 = 0x9747_b28c;
const MURMUR_SEED: u32 = 0;
const AHASH_SEEDS: (u64, u64, u64, u64) = (0x243F_6A88, 0x85A3_08D3, 0x1319_8A2E, 0x0370_7344);

/// Truncate a digest to its leading 8 bytes, big-endian.
fn lead64(digest: &[u8]) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Register the full adapter roster.
///
/// Registration order is report order: language-default hash first, then
/// checksums, then cryptographic digests, then the fast non-cryptographic
/// hashes.
pub fn build_registry() -> Result<BenchmarkRegistry, ConfigError> {
    let mut registry = BenchmarkRegistry::new();

    registry.register("siphash13", |data| {
        let mut hasher = DefaultHasher::new();
        hasher.write(data);
        hasher.finish()
    })?;

    registry.register("adler32", |data| u64::from(adler2::adler32_slice(data)))?;
    registry.register("crc32", |data| u64::from(crc32fast::hash(data)))?;
    registry.register("murmur3_32", |data| {
        let hash = murmur3::murmur3_32(&mut Cursor::new(data), MURMUR_SEED)
            .expect("in-memory read cannot fail");
        u64::from(hash)
    })?;

    registry.register("sha1", |data| lead64(&Sha1::digest(data)))?;
    registry.register("sha256", |data| lead64(&Sha256::digest(data)))?;
    registry.register("sha512", |data| lead64(&Sha512::digest(data)))?;
    registry.register("md5", |data| lead64(&Md5::digest(data)))?;

    registry.register("ahash64", |data| {
        let (k0, k1, k2, k3) = AHASH_SEEDS;
        ahash::RandomState::with_seeds(k0, k1, k2, k3).hash_one(data)
    })?;
    registry.register("xxh32", |data| u64::from(xxh32(data, XXHASH_SEED)))?;
    registry.register("xxh64", |data| xxh64(data, u64::from(XXHASH_SEED)))?;

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashmark_core::workload;

    #[test]
    fn test_roster_registers_all_algorithms() {
        let registry = build_registry().unwrap();
        assert_eq!(registry.len(), 11);
        assert_eq!(
            registry.names(),
            vec![
                "siphash13",
                "adler32",
                "crc32",
                "murmur3_32",
                "sha1",
                "sha256",
                "sha512",
                "md5",
                "ahash64",
                "xxh32",
                "xxh64",
            ]
        );
    }

    #[test]
    fn test_known_check_values() {
        let registry = build_registry().unwrap();
        let input = b"123456789";

        // Standard check values for CRC-32 and Adler-32.
        assert_eq!(registry.lookup("crc32").unwrap()(input), 0xCBF4_3926);
        assert_eq!(registry.lookup("adler32").unwrap()(input), 0x091E_01DE);
    }

    #[test]
    fn test_digest_truncation_known_answers() {
        let registry = build_registry().unwrap();
        let input = b"abc";

        assert_eq!(registry.lookup("md5").unwrap()(input), 0x9001_5098_3cd2_4fb0);
        assert_eq!(
            registry.lookup("sha1").unwrap()(input),
            0xa999_3e36_4706_816a
        );
        assert_eq!(
            registry.lookup("sha256").unwrap()(input),
            0xba78_16bf_8f01_cfea
        );
        assert_eq!(
            registry.lookup("sha512").unwrap()(input),
            0xddaf_35a1_9361_7aba
        );
    }

    #[test]
    fn test_streaming_and_oneshot_crc32_agree() {
        let buffer = workload::generate(4096, 0xCAFE_BABE).unwrap();

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&buffer);
        let streamed = hasher.finalize();

        assert_eq!(crc32fast::hash(&buffer), streamed);
    }

    #[test]
    fn test_streaming_and_oneshot_xxh32_agree() {
        let buffer = workload::generate(4096, 0xCAFE_BABE).unwrap();

        let mut streaming = xxhash_rust::xxh32::Xxh32::new(XXHASH_SEED);
        streaming.update(&buffer);

        assert_eq!(xxh32(&buffer, XXHASH_SEED), streaming.digest());
    }

    #[test]
    fn test_every_adapter_is_deterministic() {
        let registry = build_registry().unwrap();
        let buffer = workload::generate(1024, 7).unwrap();

        for entry in registry.entries() {
            assert_eq!(
                entry.call(&buffer),
                entry.call(&buffer),
                "{} returned different values on identical input",
                entry.name()
            );
        }
    }

    #[test]
    fn test_adapters_distinguish_inputs() {
        let registry = build_registry().unwrap();
        let a = workload::generate(1024, 1).unwrap();
        let b = workload::generate(1024, 2).unwrap();

        for entry in registry.entries() {
            assert_ne!(
                entry.call(&a),
                entry.call(&b),
                "{} collided on two random kilobyte buffers",
                entry.name()
            );
        }
    }
}
