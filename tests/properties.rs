//! Property tests for double-ended paginated walks

use pagewalk::{DoubleEndedSequence, Error, MemorySource, PaginatedIterator, Sequence};
use proptest::prelude::*;

/// Walk `source` taking from the front when `ops` says `true` and from the
/// back otherwise, then drain the rest forward. Returns the front and back
/// halves in the order they were produced.
fn interleaved_walk(
    source: &MemorySource<u32>,
    retries: u32,
    ops: &[bool],
) -> (Vec<u32>, Vec<u32>) {
    let mut walk = PaginatedIterator::with_retries(source, retries).unwrap();
    let mut front = Vec::new();
    let mut back = Vec::new();

    for &forward in ops {
        if !walk.has_next() {
            break;
        }
        if forward {
            front.push(walk.next().unwrap());
        } else {
            back.push(walk.reverse_next().unwrap());
        }
    }
    while walk.has_next() {
        front.push(walk.next().unwrap());
    }

    assert!(matches!(walk.next(), Err(Error::EndOfSequence)));
    assert!(matches!(walk.reverse_next(), Err(Error::EndOfSequence)));
    (front, back)
}

proptest! {
    #[test]
    fn every_record_is_yielded_exactly_once(
        len in 0usize..60,
        page_size in 1usize..8,
        ops in prop::collection::vec(any::<bool>(), 0..80),
    ) {
        let records: Vec<u32> = (0..len as u32).collect();
        let source = MemorySource::chunked(records.clone(), page_size);

        let (front, mut back) = interleaved_walk(&source, 0, &ops);
        prop_assert_eq!(front.len() + back.len(), len);

        back.reverse();
        let mut joined = front;
        joined.extend(back);
        prop_assert_eq!(joined, records);
    }

    #[test]
    fn each_page_is_fetched_at_most_twice(
        len in 1usize..40,
        page_size in 1usize..6,
        ops in prop::collection::vec(any::<bool>(), 0..50),
    ) {
        let source = MemorySource::chunked((0..len as u32).collect(), page_size);
        interleaved_walk(&source, 0, &ops);

        let pages = len.div_ceil(page_size);
        for page in 0..pages {
            prop_assert!(source.fetches(page) >= 1);
            prop_assert!(source.fetches(page) <= 2);
        }
    }

    #[test]
    fn timeouts_within_budget_are_invisible(
        len in 1usize..30,
        page_size in 1usize..5,
        retries in 0u32..4,
        faults in prop::collection::btree_map(0usize..10, 0usize..4, 0..6),
        ops in prop::collection::vec(any::<bool>(), 0..40),
    ) {
        let records: Vec<u32> = (0..len as u32).collect();
        let mut source = MemorySource::chunked(records.clone(), page_size);
        for (page, times) in faults {
            source = source.fail_with_timeouts(page, times.min(retries as usize));
        }

        let (front, mut back) = interleaved_walk(&source, retries, &ops);
        back.reverse();
        let mut joined = front;
        joined.extend(back);
        prop_assert_eq!(joined, records);
    }
}
