use crate::constants::MAX_SCRIPT_ELEMENT_SIZE;
use crate::num::{decode_num, encode_num};
use crate::script::{Command, Script};
use crate::stack::cast_to_bool;
use proptest::prelude::*;

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        // Opcodes outside the push range.
        (0x4fu8..=0xff).prop_map(|byte| Command::Op(byte.into())),
        prop::collection::vec(any::<u8>(), 1..=MAX_SCRIPT_ELEMENT_SIZE).prop_map(Command::Data),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn script_num_truthiness(n in any::<i64>().prop_filter("i64::MIN has no encoding", |n| *n != i64::MIN)) {
        let encoded = encode_num(n);
        prop_assert_eq!(cast_to_bool(&encoded), n != 0);
        prop_assert_eq!(decode_num(&encoded), Ok(n));
    }

    #[test]
    fn script_serialization_is_stable(cmds in prop::collection::vec(command(), 0..16)) {
        let script = Script::new(cmds);
        let raw = script.raw_serialize().unwrap();
        prop_assert_eq!(Script::from_raw(&raw).unwrap(), script);
    }

    #[test]
    fn parse_never_panics(data in prop::collection::vec(any::<u8>(), 0..256)) {
        if let Ok((script, consumed)) = Script::from_bytes(&data) {
            prop_assert!(consumed <= data.len());
            let all_within_limit = script.cmds().iter().all(|cmd| {
                cmd.as_data().is_none_or(|data| data.len() <= MAX_SCRIPT_ELEMENT_SIZE)
            });
            prop_assert!(all_within_limit);
        }
    }
}
