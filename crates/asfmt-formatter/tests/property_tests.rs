//! Property tests for the decorator round trip

use asfmt_formatter::{decode, encode, locate, DecoratorRange, FormatConfig, Marker, Pipeline};
use proptest::prelude::*;

const DECORATORS: &[&str] = &[
    "@inline",
    "@lazy",
    "@global",
    "@unsafe",
    "@operator(\"+\")",
    "@external('env', 'f')",
];

const DECLARATIONS: &[&str] = &[
    "let x = 1;",
    "const y: i32 = 2;",
    "export function f(a: i32): i32 { return a; }",
    "class C { m(): void {} }",
    "declare function g(): void;",
    "namespace n { export const z = 3; }",
    "enum E { A, B }",
    "class D {\n  @inline m(): void {}\n  @lazy f: i32 = 0;\n}",
];

/// One statement with up to three decorators and an optional leading comment
fn statement() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(prop::sample::select(DECORATORS), 0..3),
        prop::sample::select(vec![" ", "\n"]),
        prop::sample::select(vec![" ", "\n  "]),
        prop::sample::select(DECLARATIONS),
        any::<bool>(),
    )
        .prop_map(|(decorators, between, before_decl, decl, comment)| {
            let mut out = String::new();
            if comment {
                out.push_str("// note\n");
            }
            if !decorators.is_empty() {
                out.push_str(&decorators.join(between));
                out.push_str(before_decl);
            }
            out.push_str(decl);
            out
        })
}

fn program() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (statement(), prop::sample::select(vec!["\n", "\n\n", " "])),
        0..6,
    )
    .prop_map(|parts| {
        parts
            .into_iter()
            .map(|(stmt, sep)| format!("{stmt}{sep}"))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn transform_is_idempotent(source in program()) {
        let pipeline = Pipeline::default();
        let once = pipeline.transform(&source).expect("formats");
        let twice = pipeline.transform(&once).expect("formats again");
        prop_assert_eq!(&once, &twice);
        prop_assert!(pipeline.check_formatted(&once).expect("checks"));
    }

    #[test]
    fn output_has_no_sentinels(source in program()) {
        let out = Pipeline::default().transform(&source).expect("formats");
        let marker = Marker::for_source(&source).expect("tag");
        prop_assert!(!out.contains(marker.tag()));
        prop_assert!(!out.contains("__ASDECO_"));
    }

    #[test]
    fn decorators_survive_in_order(source in program()) {
        let out = Pipeline::default().transform(&source).expect("formats");
        let ranges = locate(&source).expect("superset source");
        let mut cursor = 0;
        for range in ranges {
            let text = range.slice(&source);
            let found = out[cursor..].find(text);
            prop_assert!(found.is_some(), "missing {} in {}", text, out);
            cursor += found.unwrap_or(0) + text.len();
        }
    }

    #[test]
    fn check_matches_transform(source in program()) {
        let pipeline = Pipeline::new(FormatConfig::default());
        let formatted = pipeline.transform(&source).expect("formats");
        prop_assert_eq!(
            pipeline.check_formatted(&source).expect("checks"),
            formatted == source
        );
    }

    #[test]
    fn decode_is_safe_to_repeat(text in "[ -~\n]{0,64}") {
        let marker = Marker::for_source(&text).expect("tag");
        let decoded = decode(&text, &marker);
        let encoded = encode(&decoded, &[], &marker).expect("no ranges");
        prop_assert_eq!(decode(encoded.text(), &marker), decoded);
    }

    #[test]
    fn encode_then_decode_restores_source(
        text in "[a-z @();\n]{0,48}",
        cuts in prop::collection::vec(0usize..48, 0..6),
    ) {
        let mut cuts: Vec<usize> = cuts.into_iter().filter(|&c| c <= text.len()).collect();
        cuts.sort_unstable();
        cuts.dedup();
        let ranges: Vec<DecoratorRange> = cuts
            .chunks_exact(2)
            .map(|pair| DecoratorRange::new(pair[0], pair[1]))
            .collect();
        let marker = Marker::for_source(&text).expect("tag");
        let encoded = encode(&text, &ranges, &marker).expect("no comment terminators");
        prop_assert_eq!(decode(encoded.text(), &marker), text.clone());
        prop_assert_eq!(encoded.to_original(encoded.text().len()), text.len());
    }
}
