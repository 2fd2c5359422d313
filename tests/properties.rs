//! Property tests for the pure conversions and the fallback invariant.

use pdftemplate_core::codec::{base64_to_bytes, bytes_to_base64};
use pdftemplate_core::font::{check_font, get_fallback_font_name, Font, FontResource};
use pdftemplate_core::template::{BasePdf, Template};
use pdftemplate_core::units::{mm2pt, pt2mm, pt2px};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

/// Font sets of one to eight entries with arbitrary fallback flags.
fn arb_font() -> impl Strategy<Value = Font> {
    prop::collection::btree_map("[A-Za-z]{1,12}", any::<bool>(), 1..8).prop_map(|flags| {
        flags
            .into_iter()
            .map(|(name, fallback)| {
                let mut resource = FontResource::new(vec![0u8, 1, 0, 0]);
                resource.fallback = fallback;
                (name, resource)
            })
            .collect::<Font>()
    })
}

fn empty_template() -> Template {
    Template::new(BasePdf::from("base.pdf"), vec![])
}

proptest! {
    /// Converting to points and back is lossless up to float rounding.
    #[test]
    fn mm_pt_round_trip(x in -1.0e9f64..1.0e9) {
        let back = pt2mm(mm2pt(x));
        prop_assert!((back - x).abs() <= 1e-9 * x.abs().max(1.0));
    }

    #[test]
    fn pt_to_px_is_linear(a in -1.0e6f64..1.0e6, b in -1.0e6f64..1.0e6) {
        let sum = pt2px(a + b);
        prop_assert!((sum - (pt2px(a) + pt2px(b))).abs() <= 1e-6 * sum.abs().max(1.0));
    }

    /// A data-URI prefix never changes the decoded bytes.
    #[test]
    fn data_uri_prefix_is_transparent(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let raw = bytes_to_base64(&bytes);
        let with_prefix = format!("data:application/pdf;base64,{}", raw);

        let decoded = base64_to_bytes(&raw).unwrap();
        prop_assert_eq!(&decoded, &bytes);
        prop_assert_eq!(base64_to_bytes(&with_prefix).unwrap(), decoded.clone());
        prop_assert_eq!(bytes_to_base64(&decoded), raw);
    }

    /// The fallback name resolves exactly when one entry is flagged, and the
    /// font check agrees on an empty template.
    #[test]
    fn fallback_resolution_matches_flag_count(font in arb_font()) {
        let flagged: Vec<&String> =
            font.iter().filter(|(_, r)| r.fallback).map(|(n, _)| n).collect();
        let resolved = get_fallback_font_name(&font);
        let checked = check_font(&font, &empty_template());

        if flagged.len() == 1 {
            prop_assert_eq!(resolved.unwrap(), flagged[0].as_str());
            prop_assert!(checked.is_ok());
        } else {
            prop_assert!(resolved.is_err());
            prop_assert!(checked.is_err());
        }
    }
}
