use std::cell::RefCell;
use std::rc::Rc;

use marginalia_primitives::{Rope, Transaction, line_span};
use proptest::prelude::*;

use super::*;

const DOC: &str = "alpha\nbravo\ncharlie\n";

fn opp(line: usize, kind: OpportunityType) -> Opportunity {
	Opportunity::new(line, 0, kind, 0.7)
}

fn place(doc: &Rope, line: usize, kind: OpportunityType) -> (Opportunity, Anchor) {
	let span = line_span(doc.slice(..), line).unwrap();
	(opp(line, kind), Anchor::for_span(&span))
}

fn publish_lines(store: &mut OverlayStateStore, doc: &Rope, lines: &[usize]) {
	let placed = lines
		.iter()
		.map(|&l| place(doc, l, OpportunityType::Transform))
		.collect();
	store.publish(placed, |pos| doc.char_to_line(pos));
}

fn edit(store: &mut OverlayStateStore, doc: &mut Rope, tx: Transaction) {
	tx.apply(doc);
	store.note_change(tx.into_changes());
	store.map_pending(|pos| doc.char_to_line(pos));
}

#[test]
fn test_publish_replaces_set() {
	let doc = Rope::from_str(DOC);
	let mut store = OverlayStateStore::new();

	publish_lines(&mut store, &doc, &[0, 1]);
	let first_ids: Vec<_> = store.markers().iter().map(|m| m.id).collect();
	assert_eq!(store.len(), 2);

	publish_lines(&mut store, &doc, &[2]);
	assert_eq!(store.len(), 1);
	assert_eq!(store.markers()[0].line, 2);
	assert!(!first_ids.contains(&store.markers()[0].id));
	assert_eq!(store.opportunities_on(0).count(), 0);
	assert_eq!(store.opportunities_on(2).count(), 1);
}

#[test]
fn test_publish_keeps_one_marker_per_identity() {
	let doc = Rope::from_str(DOC);
	let mut store = OverlayStateStore::new();
	let placed = vec![
		place(&doc, 1, OpportunityType::Quickfix),
		place(&doc, 1, OpportunityType::Quickfix),
		place(&doc, 1, OpportunityType::Transform),
	];
	store.publish(placed, |pos| doc.char_to_line(pos));

	assert_eq!(store.len(), 2);
	assert_eq!(store.opportunities_on(1).count(), 2);
	assert_eq!(store.lines().collect::<Vec<_>>(), [1]);
}

#[test]
fn test_insert_above_shifts_marker() {
	let mut doc = Rope::from_str(DOC);
	let mut store = OverlayStateStore::new();
	publish_lines(&mut store, &doc, &[1]);
	let id = store.markers()[0].id;

	let tx = Transaction::insert(doc.slice(..), 0, "new\n");
	edit(&mut store, &mut doc, tx);

	let marker = store.marker(id).unwrap();
	assert_eq!(marker.line, 2);
	assert_eq!(marker.opportunity.line, 2);
	assert_eq!(marker.anchor.pos(), 15);
	assert_eq!(doc.line(2).to_string(), "bravo\n");
}

#[test]
fn test_deleted_line_drops_marker() {
	let mut doc = Rope::from_str(DOC);
	let mut store = OverlayStateStore::new();
	publish_lines(&mut store, &doc, &[1, 2]);

	let tx = Transaction::delete(doc.slice(..), 6, 12);
	edit(&mut store, &mut doc, tx);

	assert_eq!(store.len(), 1);
	let marker = &store.markers()[0];
	assert_eq!(marker.line, 1);
	assert_eq!(marker.anchor.pos(), 13);
}

#[test]
fn test_line_deleted_with_preceding_newline_drops_marker() {
	let mut doc = Rope::from_str(DOC);
	let mut store = OverlayStateStore::new();
	publish_lines(&mut store, &doc, &[1, 2]);
	let kept = store.markers()[1].id;

	let tx = Transaction::delete(doc.slice(..), 5, 11);
	edit(&mut store, &mut doc, tx);

	assert_eq!(doc.to_string(), "alpha\ncharlie\n");
	assert_eq!(store.len(), 1);
	let marker = &store.markers()[0];
	assert_eq!(marker.id, kept);
	assert_eq!(marker.line, 1);
	assert_eq!(marker.anchor.pos(), 13);
}

#[test]
fn test_clearing_line_text_keeps_marker() {
	let mut doc = Rope::from_str(DOC);
	let mut store = OverlayStateStore::new();
	publish_lines(&mut store, &doc, &[1]);

	let tx = Transaction::delete(doc.slice(..), 6, 11);
	edit(&mut store, &mut doc, tx);

	assert_eq!(store.len(), 1);
	assert_eq!(store.markers()[0].line, 1);
	assert_eq!(store.markers()[0].anchor.pos(), 6);
}

#[test]
fn test_partial_line_edit_keeps_marker() {
	let mut doc = Rope::from_str(DOC);
	let mut store = OverlayStateStore::new();
	publish_lines(&mut store, &doc, &[1]);

	let tx = Transaction::delete(doc.slice(..), 6, 9);
	edit(&mut store, &mut doc, tx);

	assert_eq!(store.len(), 1);
	assert_eq!(store.markers()[0].line, 1);
	assert_eq!(store.markers()[0].anchor.pos(), 8);
}

#[test]
fn test_deleting_last_line_drops_marker() {
	let mut doc = Rope::from_str("a\nb");
	let mut store = OverlayStateStore::new();
	publish_lines(&mut store, &doc, &[0, 1]);

	let tx = Transaction::delete(doc.slice(..), 1, 3);
	edit(&mut store, &mut doc, tx);

	assert_eq!(store.len(), 1);
	assert_eq!(store.markers()[0].line, 0);
}

#[test]
fn test_merged_lines_collapse_to_one_marker() {
	let mut doc = Rope::from_str(DOC);
	let mut store = OverlayStateStore::new();
	publish_lines(&mut store, &doc, &[0, 1]);
	let first = store.markers()[0].id;

	let tx = Transaction::delete(doc.slice(..), 5, 6);
	edit(&mut store, &mut doc, tx);

	assert_eq!(store.len(), 1);
	assert_eq!(store.markers()[0].id, first);
	assert_eq!(store.markers()[0].line, 0);
}

#[test]
fn test_publish_maps_pending_edits_first() {
	let mut doc = Rope::from_str(DOC);
	let mut store = OverlayStateStore::new();
	publish_lines(&mut store, &doc, &[1]);

	let tx = Transaction::insert(doc.slice(..), 0, "new\n");
	tx.apply(&mut doc);
	store.note_change(tx.into_changes());
	assert!(store.has_pending_changes());

	publish_lines(&mut store, &doc, &[3]);
	assert!(!store.has_pending_changes());
	assert_eq!(store.len(), 1);
	assert_eq!(store.markers()[0].line, 3);
}

#[test]
fn test_click_reaches_sink_without_mutation() {
	let doc = Rope::from_str(DOC);
	let mut store = OverlayStateStore::new();
	let clicks: Rc<RefCell<Vec<MarkerClick>>> = Rc::default();
	let sink = clicks.clone();
	store.set_click_sink(move |click| sink.borrow_mut().push(click.clone()));

	publish_lines(&mut store, &doc, &[2]);
	let id = store.markers()[0].id;
	let version = store.version();

	let event = store.click(id).unwrap();
	assert_eq!(event.line, 2);
	assert_eq!(event.opportunity.kind, OpportunityType::Transform);
	assert_eq!(clicks.borrow().len(), 1);
	assert_eq!(store.version(), version);
	assert_eq!(store.len(), 1);

	store.clear();
	assert!(store.click(id).is_none());
	assert_eq!(clicks.borrow().len(), 1);
}

#[test]
fn test_identity_edit_is_not_recorded() {
	let doc = Rope::from_str(DOC);
	let mut store = OverlayStateStore::new();
	let tx = Transaction::change(doc.slice(..), []);
	store.note_change(tx.into_changes());
	assert!(!store.has_pending_changes());
}

proptest! {
	#[test]
	fn prop_remap_stays_in_bounds(lines in 1usize..12, a in 0usize..200, b in 0usize..200) {
		let text: String = (0..lines).map(|i| format!("line {i}\n")).collect();
		let mut doc = Rope::from_str(&text);
		let mut store = OverlayStateStore::new();
		let all: Vec<usize> = (0..lines).collect();
		publish_lines(&mut store, &doc, &all);

		let len = doc.len_chars();
		let (start, end) = (a.min(b).min(len), a.max(b).min(len));
		let tx = Transaction::delete(doc.slice(..), start, end);
		edit(&mut store, &mut doc, tx);

		let mut seen = std::collections::HashSet::new();
		for marker in store.markers() {
			prop_assert!(marker.anchor.pos() <= doc.len_chars());
			prop_assert!(marker.line < doc.len_lines());
			prop_assert!(seen.insert(marker.identity()));
		}
		prop_assert!(store.len() <= lines);
	}
}
