//! Property-based tests for guide JSON round-tripping.
//!
//! Approach:
//! 1. Generate valid guide documents (bounded block trees)
//! 2. Serialize to JSON
//! 3. Run the full parse-and-validate pipeline
//! 4. Compare the recovered guide to the original

use proptest::prelude::*;

use waymark_api::{Block, Guide, GuideMatch, InputType, InteractiveAction, Step};
use waymark_json::parse_and_validate_guide;

// ============================================================================
// Strategy: Valid identifiers and text
// ============================================================================

fn valid_id() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,19}"
}

fn valid_title() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9 ]{0,40}"
}

fn valid_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,!?]{1,80}"
}

fn valid_selector() -> impl Strategy<Value = String> {
    "[a-z]{2,8}:[a-z-]{1,20}"
}

fn action_strategy() -> impl Strategy<Value = InteractiveAction> {
    prop::sample::select(InteractiveAction::ALL.to_vec())
}

// ============================================================================
// Strategy: Steps and leaf blocks
// ============================================================================

fn step_strategy() -> impl Strategy<Value = Step> {
    (
        action_strategy(),
        valid_selector(),
        valid_text(),
        prop::option::of(valid_text()),
    )
        .prop_map(|(action, selector, value, tooltip)| {
            let mut step = Step::new(action);
            if action.requires_reftarget() {
                step = step.with_reftarget(selector);
            }
            if action.requires_value() {
                step = step.with_targetvalue(value);
            }
            if let Some(tooltip) = tooltip {
                step = step.with_tooltip(tooltip);
            }
            step
        })
}

fn leaf_block_strategy() -> impl Strategy<Value = Block> {
    prop_oneof![
        valid_text().prop_map(Block::markdown),
        valid_text().prop_map(|content| Block::Html { content }),
        (valid_selector(), prop::option::of(valid_text())).prop_map(|(src, alt)| Block::Image {
            src,
            alt,
            caption: None,
        }),
        valid_selector().prop_map(|src| Block::Video { src, caption: None }),
        (action_strategy(), valid_selector(), valid_text()).prop_map(
            |(action, selector, value)| {
                let reftarget = action.requires_reftarget().then_some(selector);
                let targetvalue = action.requires_value().then_some(value);
                Block::Interactive {
                    action,
                    reftarget,
                    content: None,
                    targetvalue,
                    requirements: None,
                    skippable: None,
                }
            }
        ),
        (
            prop::option::of(valid_text()),
            prop::collection::vec(step_strategy(), 0..=4)
        )
            .prop_map(|(content, steps)| Block::Multistep {
                content,
                steps,
                requirements: None,
                skippable: None,
            }),
        (
            prop::option::of(valid_text()),
            prop::collection::vec(step_strategy(), 0..=4)
        )
            .prop_map(|(content, steps)| Block::Guided {
                content,
                steps,
                requirements: None,
                skippable: None,
            }),
        (
            valid_text(),
            prop::collection::vec(valid_text(), 1..=4),
            prop::option::of(valid_text())
        )
            .prop_flat_map(|(question, options, explanation)| {
                let count = options.len();
                (Just(question), Just(options), 0..count, Just(explanation))
            })
            .prop_map(|(question, options, correct_answer, explanation)| Block::Quiz {
                question,
                options,
                correct_answer,
                explanation,
            }),
        (
            valid_text(),
            prop::option::of(prop::sample::select(InputType::ALL.to_vec()))
        )
            .prop_map(|(prompt, input_type)| Block::Input {
                prompt,
                input_type,
                placeholder: None,
                required: None,
            }),
    ]
}

// ============================================================================
// Strategy: Containers and whole guides
// ============================================================================

fn block_strategy() -> impl Strategy<Value = Block> {
    prop_oneof![
        4 => leaf_block_strategy(),
        1 => (
            prop::option::of(valid_title()),
            prop::collection::vec(leaf_block_strategy(), 0..=3)
        )
            .prop_map(|(title, blocks)| Block::Section { title, blocks }),
        1 => (
            prop::collection::vec(valid_id(), 1..=2),
            prop::collection::vec(leaf_block_strategy(), 0..=2),
            prop::collection::vec(leaf_block_strategy(), 0..=2)
        )
            .prop_map(|(conditions, when_true, when_false)| Block::Conditional {
                conditions,
                when_true,
                when_false,
            }),
    ]
}

fn guide_strategy() -> impl Strategy<Value = Guide> {
    (
        valid_id(),
        valid_title(),
        prop::option::of((
            prop::collection::vec("/[a-z]{1,10}".prop_map(String::from), 0..=2),
            prop::collection::vec(valid_id(), 0..=2),
        )),
        prop::collection::vec(block_strategy(), 1..=6),
    )
        .prop_map(|(id, title, match_rules, blocks)| {
            let mut guide = Guide::new(id, title).with_blocks(blocks);
            if let Some((url_prefix, tags)) = match_rules {
                guide = guide.with_match_rules(GuideMatch { url_prefix, tags });
            }
            guide
        })
}

// ============================================================================
// PBT: serialize -> parse-and-validate -> compare
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        ..ProptestConfig::default()
    })]

    #[test]
    fn generated_guides_validate_and_round_trip(guide in guide_strategy()) {
        let json = serde_json::to_string(&guide).unwrap();
        let report = parse_and_validate_guide(&json);

        prop_assert!(
            report.is_valid,
            "generated guide failed validation: {:?}\n\nJSON:\n{}",
            report.errors, json
        );
        prop_assert_eq!(report.guide.unwrap(), guide);
    }

    #[test]
    fn pretty_and_compact_forms_agree(guide in guide_strategy()) {
        let compact = serde_json::to_string(&guide).unwrap();
        let pretty = waymark_json::guide_to_json(&guide).unwrap();

        let from_compact = parse_and_validate_guide(&compact);
        let from_pretty = parse_and_validate_guide(&pretty);

        prop_assert!(from_compact.is_valid && from_pretty.is_valid);
        prop_assert_eq!(from_compact.guide, from_pretty.guide);
    }

    #[test]
    fn truncated_json_never_panics(guide in guide_strategy(), cut in 0usize..40) {
        let json = serde_json::to_string(&guide).unwrap();
        let truncated: String = json.chars().take(json.len().saturating_sub(cut)).collect();

        // Any outcome is fine; the validator must just not panic.
        let _ = parse_and_validate_guide(&truncated);
    }
}
