//! Base58Check encodings for legacy addresses and private keys.

use bitcoin::base58;

const P2PKH_MAINNET: u8 = 0x00;
const P2PKH_TESTNET: u8 = 0x6f;
const P2SH_MAINNET: u8 = 0x05;
const P2SH_TESTNET: u8 = 0xc4;
const WIF_MAINNET: u8 = 0x80;
const WIF_TESTNET: u8 = 0xef;

fn encode_with_prefix(prefix: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(1 + payload.len());
    data.push(prefix);
    data.extend_from_slice(payload);
    base58::encode_check(&data)
}

pub fn p2pkh_address(h160: &[u8; 20], testnet: bool) -> String {
    let prefix = if testnet { P2PKH_TESTNET } else { P2PKH_MAINNET };
    encode_with_prefix(prefix, h160)
}

pub fn p2sh_address(h160: &[u8; 20], testnet: bool) -> String {
    let prefix = if testnet { P2SH_TESTNET } else { P2SH_MAINNET };
    encode_with_prefix(prefix, h160)
}

/// Wallet Import Format: prefix, 32-byte secret and a `0x01` suffix for
/// compressed keys.
pub fn wif(secret: &[u8; 32], compressed: bool, testnet: bool) -> String {
    let prefix = if testnet { WIF_TESTNET } else { WIF_MAINNET };
    let mut payload = secret.to_vec();
    if compressed {
        payload.push(0x01);
    }
    encode_with_prefix(prefix, &payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Ecc, PrivateKey};
    use hex_literal::hex;

    #[test]
    fn test_p2pkh_addresses() {
        let ecc = Ecc::new();
        let cases = [
            (5002u64, false, true, "mmTPbXQFxboEtNRkwfh6K51jvdtHLxGeMA"),
            (2020u64.pow(5), true, true, "mopVkxp8UhXqRYbCYJsbeE1h1fiF64jcoH"),
            (0x12345deadbeef, true, false, "1F1Pn2y6pDb68E5nYJJeba4TLg2U7B6KF1"),
        ];
        for (secret, compressed, testnet, expected) in cases {
            let point = ecc.public_key(&PrivateKey::from_u64(secret).unwrap());
            assert_eq!(point.address(compressed, testnet), expected);
        }
    }

    #[test]
    fn test_p2sh_addresses() {
        let h160 = hex!("4733f37cf4db86fbc2efed2500b4f4e49f312023");
        assert_eq!(p2sh_address(&h160, false), "38BW8nqpHSWpkf5sXrQd2xYwvnPJwP59ic");
        assert_eq!(p2sh_address(&h160, true), "2MyjiCXmqtu2AxSiRCz2VeuYD98bUhXRzNR");
    }

    #[test]
    fn test_wif() {
        let key = PrivateKey::from_slice(&hex!(
            "0dba685b4511dbd3d368e5c4358a1277de9486447af7b3604a69b8d9d8b7889d"
        ))
        .unwrap();
        assert_eq!(
            key.wif(false, false),
            "5HvLFPDVgFZRK9cd4C5jcWki5Skz6fmKqi1GQJf5ZoMofid2Dty"
        );

        let mut secret = [0xffu8; 32];
        // 2^256 - 2^199
        secret[7] = 0x80;
        secret[8..].fill(0);
        assert_eq!(
            wif(&secret, true, false),
            "L5oLkpV3aqBJ4BgssVAsax1iRa77G5CVYnv9adQ6Z87te7TyUdSC"
        );

        let key = PrivateKey::from_u64(8675309).unwrap();
        assert_eq!(
            key.wif(true, false),
            "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rdcJfsz6iB4Q"
        );
    }
}
