use std::net::Ipv4Addr;

use cisx_ir::addr::{mask_to_prefix, parse_v4_token};
use proptest::prelude::*;

fn contiguous_mask(len: u32) -> String {
    let bits = if len == 0 { 0 } else { u32::MAX << (32 - len) };
    Ipv4Addr::from(bits).to_string()
}

proptest! {
    #[test]
    fn contiguous_masks_map_to_their_length(len in 0u32..=32) {
        let mask = contiguous_mask(len);
        prop_assert_eq!(mask_to_prefix(&mask), Some(len as u8));
    }

    #[test]
    fn prefix_never_exceeds_leading_run(bits in any::<u32>()) {
        let mask = Ipv4Addr::from(bits).to_string();
        let prefix = mask_to_prefix(&mask).expect("dotted quad");
        prop_assert_eq!(u32::from(prefix), bits.leading_ones());
    }

    #[test]
    fn any_dotted_quad_is_a_v4_token(bits in any::<u32>(), len in 0u8..=32) {
        let addr = Ipv4Addr::from(bits).to_string();
        let token = format!("{addr}/{len}");
        prop_assert_eq!(parse_v4_token(&token), Some((addr.as_str(), Some(len))));
    }
}
