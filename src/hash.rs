// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Seeded diffusion hash used to derive bucket indexes.
//!
//! Every input byte selects a pseudo-random 32-bit constant, which is
//! rotated according to the byte's distance from the end of the buffer
//! and folded into the running result with XOR. The output is stable
//! across runs and platforms, and matches the hash used by the reference
//! rule engine bit for bit.

/// Per-byte diffusion constants.
#[rustfmt::skip]
static BYTE_TO_U32: [u32; 256] = [
    0xC311_3E7F, 0x4C35_3C5F, 0x7423_810B, 0x258D_264E, 0xDAD3_9DED, 0x75D0_B694,
    0x98CE_1216, 0x9333_4482, 0xC5C4_8EA5, 0xF57E_0E8B, 0x5D7F_3723, 0x396B_1B24,
    0xA888_3D9F, 0xB2A7_4A00, 0xF8E1_71AE, 0x3F01_FBAB, 0x5C18_40CB, 0xDDD8_33C4,
    0x8D8C_CA34, 0x32EF_223A, 0x1A05_B871, 0x9A9B_6BFC, 0x5040_6A0C, 0xE7E1_FC04,
    0x5E07_D7F6, 0x80B8_3660, 0x2089_2A62, 0xB2C6_FEA6, 0x6CEC_7CAA, 0x182F_764B,
    0x3B03_53E7, 0x57FC_2520, 0x4B68_12D4, 0xACB6_54E4, 0x23C7_5C04, 0xB1DC_D731,
    0xE3AF_0733, 0xF236_6D39, 0xC729_671B, 0xFF3B_E6F2, 0xABA3_7E34, 0x3CDA_FA38,
    0xAAD1_8D03, 0xA8D3_5345, 0x08E9_A92C, 0xF932_4059, 0x42D8_21BE, 0x1BC1_52DD,
    0x5588_811C, 0x874A_1F9A, 0x6E83_E9CD, 0xDA6F_3AF8, 0x965D_4670, 0xA7A5_65C0,
    0x68D8_A9AF, 0xFC8F_D8FD, 0x8FF9_9FF9, 0x4C9B_42AE, 0x2D06_6A8D, 0x4D18_02F7,
    0x5570_32B2, 0x12BC_F371, 0xDC29_D5AE, 0x72EA_361F, 0xE283_5B0B, 0xDFC5_8966,
    0x13B0_F34D, 0x3FA0_2BCD, 0xBF28_2E3D, 0x7DC8_77F5, 0xF484_8A32, 0x861E_35F5,
    0x7FFA_0D7F, 0x515F_2E4E, 0x6B23_5D5C, 0x55F4_6E24, 0x35AD_2C99, 0x0726_54A8,
    0x0516_3F0F, 0x9317_B11A, 0xAED1_FC10, 0x9894_44F0, 0xDB3E_1814, 0x446C_0CF1,
    0x660B_F511, 0x2F22_7D3A, 0xFDBA_0539, 0xC649_E621, 0x5204_D7CE, 0x5FA3_86D0,
    0xE5F2_2005, 0x97B6_C8A1, 0x4AB6_9EC2, 0x5C7C_A70D, 0x39A4_8EC6, 0x7BAC_F378,
    0x8D0E_D3D1, 0xE39D_E582, 0xC5FB_E2AB, 0x37E3_D2D0, 0x06F4_4724, 0x7314_4144,
    0xBA57_E905, 0xB05B_4307, 0xAEED_8D97, 0xA68C_CAC4, 0xE30D_A57E, 0xED0F_194B,
    0x8C2B_9B7A, 0x8145_75D5, 0x7958_8493, 0x81D3_712A, 0x3FA8_92F2, 0x80F0_BB94,
    0x44EA_F51A, 0x4E05_F1D4, 0xFC69_F858, 0x775E_8D60, 0x22B2_0DD7, 0x170A_87EA,
    0x1077_DE52, 0x3D5E_C9FB, 0x0B6E_B1E5, 0xF2F9_CCAF, 0xA76C_7DEB, 0xD8C2_D873,
    0xF438_C592, 0x6239_FEEC, 0x26D3_D2A9, 0x30F6_FADF, 0x4B29_84CC, 0x6257_F3DA,
    0x0E05_83E2, 0x143E_5E61, 0xBB27_32BF, 0x9653_217A, 0x027A_84EA, 0x95C9_AE8B,
    0x89B8_B82B, 0x9F28_6485, 0x29F6_22FE, 0x52A3_196B, 0x8392_D95F, 0x33A7_9167,
    0xF5DE_E92A, 0x6E39_7DB9, 0x1193_1C01, 0x8DD2_CD3B, 0xF9E6_003D, 0xAB95_5AF4,
    0xD387_25F9, 0xDCF6_F8AE, 0x7667_A958, 0xE67A_D995, 0xB7CF_979A, 0xD88E_BE5B,
    0x5BA8_89F0, 0x078B_DD90, 0x4472_38F9, 0x3135_F672, 0x187B_95A8, 0x0B7D_5751,
    0xACD5_9D2A, 0x9C5D_1929, 0x579E_5022, 0xEA90_499B, 0x5990_1800, 0x8223_7DB5,
    0x7A37_5509, 0xACA9_A22A, 0xEC96_E649, 0x6933_9DB0, 0x081D_0D9B, 0xD72F_B8B9,
    0xA418_4653, 0xC057_321D, 0xED19_CAB9, 0xB48F_1E3E, 0xB9DA_C51E, 0xDAED_2FC7,
    0x7598_CBBD, 0x208D_F346, 0x044B_E6EC, 0x1C63_E6EB, 0xA15F_64C1, 0xE024_A061,
    0x6830_9584, 0x0758_A68D, 0xF274_E9AE, 0x0ABE_A0CC, 0xED4F_B267, 0x63D6_EC46,
    0x9F28_E026, 0xF069_4A17, 0x9D6E_9115, 0xC460_0FAD, 0x5B12_1E99, 0xD6B4_A13B,
    0xF536_4B8A, 0x8514_B254, 0x0182_F8DD, 0xDB09_F90B, 0x78C7_0B32, 0xD8EC_3B02,
    0x8CD7_084D, 0xA443_9838, 0x72F3_5A3D, 0x200B_48A5, 0xE235_1444, 0xA555_2F5F,
    0xD8C1_E746, 0x0FE5_EF3C, 0xB6A4_7063, 0x61F4_E68B, 0x08FE_D99B, 0x7E46_1445,
    0x43CB_8380, 0x28BA_03C8, 0x21A7_A2E2, 0x4343_7ED6, 0x2A9E_6670, 0x89B4_A106,
    0xC6C2_F4EE, 0x9C40_63CC, 0x2FA0_DF6C, 0xB54D_C409, 0xCF01_538F, 0x6164_31D7,
    0x02CB_0E4D, 0x44FF_F425, 0xAAD5_188E, 0x0742_E9BC, 0xFFF4_1353, 0x130F_0A15,
    0x787B_DC10, 0x4A32_7B72, 0x7029_89F7, 0x5F70_4798, 0x8156_A1BB, 0x2BCA_3E74,
    0x1911_A8C4, 0x5E1F_27D3, 0x0794_9DC7, 0xF24C_2056, 0xB429_9EE6, 0x9C70_45D9,
    0xA8BF_6307, 0x7454_AAD2, 0x2564_25E5, 0xD87D_EF67, 0xCFE9_5452, 0xE754_8DF7,
    0xA849_56C7, 0xD840_2C60, 0xCFBD_0373, 0x6B6C_DAFE,
];

#[inline]
#[allow(clippy::indexing_slicing)]
fn diffuse(byte: u8) -> u32 {
    BYTE_TO_U32[usize::from(byte)]
}

/// Hashes `bytes`, starting from `seed`.
///
/// An empty buffer hashes to `seed` itself, which allows chaining:
/// the result of one call can be fed as the seed of the next.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn hash(seed: u32, bytes: &[u8]) -> u32 {
    let Some((&last, rest)) = bytes.split_last() else {
        return seed;
    };

    // The byte at index `k` is rotated by its distance to the last byte
    let len = rest.len();

    let folded = rest.iter().enumerate().fold(seed, |acc, (idx, &byte)| {
        let shift = ((len - idx) % 32) as u32;
        acc ^ diffuse(byte).rotate_left(shift)
    });

    folded ^ diffuse(last)
}

/// Maps a key and optional namespace onto one of `bucket_count` buckets.
///
/// The key is hashed with a zero seed; if a namespace is given, its bytes
/// are hashed next, seeded with the key hash.
#[must_use]
pub fn bucket_index(key: &[u8], namespace: Option<&str>, bucket_count: usize) -> usize {
    debug_assert!(bucket_count > 0, "bucket count should never be zero");

    let mut h = hash(0, key);

    if let Some(ns) = namespace {
        h = hash(h, ns.as_bytes());
    }

    (h as usize) % bucket_count
}
