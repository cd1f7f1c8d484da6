use marker_overlay::{apply_markers, validate, Document, LineEnding, Marker, MarkerSet};
use proptest::prelude::*;

fn document(lines: &[String]) -> Document {
    Document::from_lines(lines, LineEnding::Lf, true)
}

fn patch(doc: &Document, markers: Vec<Marker>) -> Document {
    let validated = validate(doc, MarkerSet::from(markers)).expect("markers should validate");
    apply_markers(doc, validated).into_document()
}

fn lines_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{0,6}", 0..24)
}

/// Per original line: replace it, and/or insert after it.
fn edits_strategy() -> impl Strategy<Value = (Vec<String>, Vec<(bool, bool)>, bool)> {
    lines_strategy().prop_flat_map(|lines| {
        let n = lines.len();
        (
            Just(lines),
            prop::collection::vec((any::<bool>(), any::<bool>()), n),
            any::<bool>(),
        )
    })
}

/// Markers with distinct anchors in shuffled authoring order, plus the
/// document they must produce.
fn overlay_case() -> impl Strategy<Value = (Vec<String>, Vec<Marker>, Vec<String>)> {
    edits_strategy().prop_flat_map(|(lines, edits, top)| {
        let mut markers = Vec::new();
        let mut expected = Vec::new();
        if top {
            markers.push(Marker::insertion(0, ["TOP"]));
            expected.push("TOP".to_string());
        }
        for (i, (replace, insert)) in edits.iter().enumerate() {
            let n = i + 1;
            if *replace {
                markers.push(Marker::new(n, 1, [format!("R{n}")]));
                expected.push(format!("R{n}"));
            } else {
                expected.push(lines[i].clone());
            }
            if *insert {
                markers.push(Marker::insertion(n, [format!("I{n}")]));
                expected.push(format!("I{n}"));
            }
        }
        (Just(lines), Just(markers).prop_shuffle(), Just(expected))
    })
}

proptest! {
    #[test]
    fn empty_marker_set_is_identity(lines in lines_strategy(), trailing in any::<bool>()) {
        let doc = Document::from_lines(&lines, LineEnding::Lf, trailing);
        let patched = patch(&doc, Vec::new());
        prop_assert_eq!(patched.serialize(), doc.serialize());
    }

    #[test]
    fn markers_address_original_lines((lines, markers, expected) in overlay_case()) {
        let doc = document(&lines);
        let patched = patch(&doc, markers);
        prop_assert_eq!(patched.lines(), expected.as_slice());
    }

    #[test]
    fn line_count_follows_spans(
        lines in prop::collection::vec("[a-z]{1,4}", 1..24),
        payload in prop::collection::vec("[A-Z]{1,4}", 0..5),
        split in any::<prop::sample::Index>(),
    ) {
        let doc = document(&lines);
        let start = split.index(lines.len()) + 1;
        let span = lines.len() - start + 1;

        let patched = patch(&doc, vec![Marker::new(start, span, payload.clone())]);
        prop_assert_eq!(patched.len(), lines.len() - span + payload.len());
        prop_assert_eq!(&patched.lines()[..start - 1], &lines[..start - 1]);
    }

    #[test]
    fn insertion_inside_replacement_is_rejected(
        lines in prop::collection::vec("[a-z]{1,4}", 2..24),
        a in any::<prop::sample::Index>(),
        b in any::<prop::sample::Index>(),
    ) {
        let n = lines.len();
        let start = a.index(n - 1) + 1;
        let span = n - start + 1;
        // Anchors start..=last-1 would split the replaced range.
        let anchor = start + b.index(span - 1);

        let doc = document(&lines);
        let markers = MarkerSet::from(vec![
            Marker::new(start, span, ["x"]),
            Marker::insertion(anchor, ["y"]),
        ]);
        let err = validate(&doc, markers).unwrap_err();
        prop_assert!(err.has_overlap());
        prop_assert!(!err.has_out_of_bounds());
    }

    #[test]
    fn markers_past_the_end_are_rejected(
        lines in lines_strategy(),
        extra in 1usize..5,
        span in 0usize..4,
    ) {
        let n = lines.len();
        let doc = document(&lines);
        let marker = if span == 0 {
            Marker::insertion(n + extra, ["x"])
        } else {
            Marker::new(n + extra, span, ["x"])
        };

        let err = validate(&doc, MarkerSet::from(vec![marker])).unwrap_err();
        prop_assert!(err.has_out_of_bounds());
        prop_assert_eq!(err.issues.len(), 1);
    }
}
