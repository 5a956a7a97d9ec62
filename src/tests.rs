use super::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    cell::Cell,
    collections::hash_map::DefaultHasher,
    hash::Hasher,
    panic::{catch_unwind, AssertUnwindSafe},
};

struct DropCount<'a, T: Copy>(&'a Cell<usize>, T);

impl<'a, T: Copy> Drop for DropCount<'a, T> {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1)
    }
}

fn storage<I: IntoIterator<Item = i32>>(items: I) -> Storage<i32> {
    items.into_iter().collect()
}

#[test]
fn test_hugelist_new() {
    let v = HugeList::<()>::new();
    assert_eq!(v.len(), 0);
    assert!(v.is_empty());
    assert_eq!(v.max_block_size(), DEFAULT_BLOCK_SIZE);
    assert_eq!(v.segment_count(), 0);
    assert_eq!(v.version(), 0);
    assert!(!v.is_read_only());
    assert!(v.validate().is_ok());

    let v = HugeList::<u8>::try_with_block_size(16).unwrap();
    assert_eq!(v.max_block_size(), 16);
    assert!(matches!(
        HugeList::<u8>::try_with_block_size(0),
        Err(HugeListError::InvalidArgument { .. })
    ));

    let mut map = AvlRangeMap::new();
    assert!(map.insert(0, 1, Block::from_storage(storage([1]))).is_ok());
    assert!(matches!(
        HugeList::with_map(map, 4),
        Err(HugeListError::InvalidArgument { .. })
    ));
}

#[test]
#[should_panic]
fn test_hugelist_zero_block_size() {
    let _ = HugeList::<u8>::with_block_size(0);
}

#[test]
fn test_hugelist_remove_from_middle() {
    let mut v = HugeList::with_block_size(4);
    v.insert_range(0, 1..=9).unwrap();
    assert_eq!(v.len(), 9);
    assert_eq!(v.to_vec(), (1..=9).collect::<Vec<_>>());
    v.validate().unwrap();

    v.remove_range(2, 3).unwrap();
    assert_eq!(v.to_vec(), vec![1, 2, 6, 7, 8, 9]);
    assert_eq!(v.len(), 6);
    v.validate().unwrap();
    let lens: Vec<_> = v.chunks().map(|c| c.items.len()).collect();
    assert_eq!(lens.iter().sum::<usize>(), 6);
    assert!(lens.iter().all(|&l| l <= 4));
}

#[test]
fn test_hugelist_join_adjacent() {
    let mut v: HugeList<i32> = HugeList::with_block_size(4);
    assert!(v.map.insert(0, 1, Block::from_storage(storage([1]))).is_ok());
    assert!(v.map.insert(1, 2, Block::from_storage(storage([2, 3]))).is_ok());
    match v.validate() {
        Err(HugeListError::InvariantViolation { reason, dump }) => {
            assert!(reason.contains("fit into one block"), "{}", reason);
            assert!(dump.contains("start=1 length=2 capacity=2"), "{}", dump);
        }
        other => panic!("expected an invariant violation, got {:?}", other),
    }

    assert!(v.try_join(0));
    assert_eq!(v.segment_count(), 1);
    v.validate().unwrap();
    assert_eq!(v.to_vec(), vec![1, 2, 3]);
    assert!(!v.try_join(0));
}

#[test]
fn test_hugelist_validate_rejects_stray_slack() {
    let mut v: HugeList<i32> = HugeList::with_block_size(4);
    let mut a = Block::with_capacity(4);
    a.fill_from(&mut (0..3), 3);
    let mut b = Block::with_capacity(4);
    b.fill_from(&mut (3..5), 2);
    assert!(v.map.insert(0, 3, a).is_ok());
    assert!(v.map.insert(3, 2, b).is_ok());
    v.slack = Some(0);
    assert!(matches!(
        v.validate(),
        Err(HugeListError::InvariantViolation { .. })
    ));
    v.slack = Some(3);
    assert!(v.validate().is_err());
    v.block_mut(0).trim();
    v.validate().unwrap();
}

#[test]
fn test_hugelist_push_pop() {
    let mut v = HugeList::with_block_size(8);
    for i in 0..100 {
        v.push(i);
    }
    assert_eq!(v.len(), 100);
    assert_eq!(v.first(), Some(&0));
    assert_eq!(v.last(), Some(&99));
    // appends fill every segment before starting the next one
    assert_eq!(v.segment_count(), 13);
    v.validate().unwrap();
    for i in (0..100).rev() {
        assert_eq!(v.pop(), Some(i));
        v.validate().unwrap();
    }
    assert_eq!(v.pop(), None);
    assert_eq!(v.segment_count(), 0);
}

#[test]
fn test_hugelist_insert_positions() {
    let mut v = HugeList::with_block_size(4);
    let mut model = Vec::new();
    for i in 0..40 {
        let index = match i % 3 {
            0 => 0,
            1 => model.len(),
            _ => model.len() / 2,
        };
        v.insert(index, i).unwrap();
        model.insert(index, i);
        v.validate().unwrap();
    }
    assert_eq!(v.to_vec(), model);

    v.insert_range(17, 100..111).unwrap();
    let tail = model.split_off(17);
    model.extend(100..111);
    model.extend(tail);
    v.validate().unwrap();
    assert_eq!(v.to_vec(), model);
    assert!(v.segment_count() <= 2 * v.len() / 4 + 1);
}

#[test]
fn test_hugelist_insert_slice_and_default() {
    let mut v: HugeList<u8> = HugeList::with_block_size(4);
    v.insert_default(0, 6).unwrap();
    v.insert_slice(3, &[1, 2, 3, 4, 5], 1, 3).unwrap();
    assert_eq!(v.to_vec(), vec![0, 0, 0, 2, 3, 4, 0, 0, 0]);
    v.replace_slice(0, 2, &[9, 9, 9], 0, 3).unwrap();
    assert_eq!(v.to_vec(), vec![9, 9, 9, 0, 2, 3, 4, 0, 0, 0]);
    v.validate().unwrap();

    assert!(v.remove_item(&4));
    assert!(!v.remove_item(&7));
    assert_eq!(v.to_vec(), vec![9, 9, 9, 0, 2, 3, 0, 0, 0]);
    v.validate().unwrap();
}

#[test]
fn test_hugelist_errors_leave_list_unchanged() {
    let mut v: HugeList<i32> = HugeList::with_block_size(4);
    v.add_range(0..10).unwrap();
    let dump = v.dump();
    let version = v.version();

    assert_eq!(
        v.insert(11, 0),
        Err(HugeListError::OutOfBounds {
            caller: "HugeList::insert",
            index: 11,
            len: 10
        })
    );
    assert_eq!(
        v.remove_range(8, 3),
        Err(HugeListError::OutOfBounds {
            caller: "HugeList::remove_range",
            index: 11,
            len: 10
        })
    );
    assert!(matches!(
        v.remove_at(10),
        Err(HugeListError::OutOfBounds { index: 10, .. })
    ));
    assert!(matches!(
        v.remove_range(usize::MAX, 2),
        Err(HugeListError::Overflow { .. })
    ));
    assert!(matches!(
        v.insert_slice(0, &[1, 2], 1, 2),
        Err(HugeListError::OutOfBounds { .. })
    ));
    assert!(v.replace_range(9, 2, [1]).is_err());
    assert!(v.set(10, 1).is_err());
    assert!(v.copy_to(0, &mut [0; 3], 1, 3).is_err());
    assert!(v
        .iterate_range_with(0, 5, &mut [0u8; 4], 0, |_, _| {})
        .is_err());
    assert!(v.index_of_range(&1, 5, 6).is_err());
    assert!(v.drain_range(4, 7).is_err());

    assert_eq!(v.dump(), dump);
    assert_eq!(v.version(), version);

    let mut z: HugeList<()> = HugeList::new();
    z.push(());
    assert!(matches!(
        z.insert_default(0, usize::MAX),
        Err(HugeListError::Overflow { .. })
    ));
    assert_eq!(z.len(), 1);
}

#[test]
#[should_panic(expected = "HugeList::index: index out of bounds: index is 3, len is 3")]
fn test_hugelist_index_oob() {
    let v: HugeList<i32> = (0..3).collect();
    let _ = v[3];
}

#[test]
fn test_hugelist_index_mut() {
    let mut v: HugeList<i32> = (0..10).collect();
    v[4] = 40;
    assert_eq!(v.set(5, 50), Ok(5));
    *v.get_mut(6).unwrap() = 60;
    assert_eq!(v.to_vec(), vec![0, 1, 2, 3, 40, 50, 60, 7, 8, 9]);
    assert_eq!(v.get(10), None);
}

#[test]
fn test_hugelist_drop_counts() {
    let dc = Cell::new(0usize);
    let mut v = HugeList::with_block_size(8);
    for i in 0..100 {
        v.push(DropCount(&dc, i));
    }
    assert_eq!(dc.get(), 0);

    v.remove_range(10, 30).unwrap();
    assert_eq!(dc.get(), 30);

    let removed = v.remove_at(0).unwrap();
    assert_eq!(removed.1, 0);
    assert_eq!(dc.get(), 30);
    drop(removed);
    assert_eq!(dc.get(), 31);

    let drained = v.drain_range(0, 5).unwrap();
    assert_eq!(
        drained.iter().map(|d| d.1).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5]
    );
    drop(drained);
    assert_eq!(dc.get(), 36);

    v.truncate(50);
    assert_eq!(v.len(), 50);
    assert_eq!(dc.get(), 50);
    v.validate().unwrap();

    let mut iter = v.into_iter();
    assert_eq!(iter.next().map(|d| d.1), Some(6));
    assert_eq!(iter.next_back().map(|d| d.1), Some(85));
    assert_eq!(dc.get(), 52);
    drop(iter);
    assert_eq!(dc.get(), 100);
}

#[test]
fn test_hugelist_iter() {
    let mut v = HugeList::with_block_size(3);
    v.add_range(1..=7).unwrap();
    assert_eq!(v.iter().size_hint(), (7, Some(7)));
    assert_eq!(
        v.iter().copied().collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5, 6, 7]
    );
    assert_eq!(
        v.iter().rev().copied().collect::<Vec<_>>(),
        vec![7, 6, 5, 4, 3, 2, 1]
    );

    let mut iter = v.iter();
    assert_eq!(iter.next().unwrap(), &1);
    assert_eq!(iter.next_back().unwrap(), &7);
    assert_eq!(iter.size_hint(), (5, Some(5)));
    assert_eq!(iter.next().unwrap(), &2);
    assert_eq!(iter.next_back().unwrap(), &6);
    assert_eq!(iter.next().unwrap(), &3);
    assert_eq!(iter.next_back().unwrap(), &5);
    assert_eq!(iter.size_hint(), (1, Some(1)));
    assert_eq!(iter.next_back().unwrap(), &4);
    assert_eq!(iter.next(), None);
    assert_eq!(iter.next_back(), None);

    let mut sum = 0;
    for x in &v {
        sum += x;
    }
    assert_eq!(sum, 28);
}

#[test]
fn test_hugelist_into_iter() {
    let mut v = HugeList::with_block_size(4);
    v.add_range(0..10).unwrap();
    let w = v.clone();
    assert_eq!(v.into_iter().collect::<Vec<_>>(), (0..10).collect::<Vec<_>>());
    assert_eq!(
        w.into_iter().rev().collect::<Vec<_>>(),
        (0..10).rev().collect::<Vec<_>>()
    );

    let mut v = HugeList::with_block_size(4);
    v.add_range(0..10).unwrap();
    let mut iter = v.into_iter();
    let mut front = Vec::new();
    let mut back = Vec::new();
    while let Some(x) = iter.next() {
        front.push(x);
        if let Some(y) = iter.next_back() {
            back.push(y);
        }
    }
    assert_eq!(front, vec![0, 1, 2, 3, 4]);
    assert_eq!(back, vec![9, 8, 7, 6, 5]);
}

#[test]
fn test_hugelist_chunks() {
    let mut v = HugeList::with_block_size(4);
    v.add_range(0..10).unwrap();
    let chunks: Vec<_> = v.chunks().map(|c| (c.start, c.items.to_vec())).collect();
    assert_eq!(
        chunks,
        vec![
            (0, vec![0, 1, 2, 3]),
            (4, vec![4, 5, 6, 7]),
            (8, vec![8, 9])
        ]
    );
    let clipped: Vec<_> = v
        .chunks_range(2, 5)
        .unwrap()
        .map(|c| (c.start, c.items.to_vec()))
        .collect();
    assert_eq!(clipped, vec![(2, vec![2, 3]), (4, vec![4, 5, 6])]);
    assert_eq!(v.chunks_range(10, 0).unwrap().count(), 0);

    let rev: Vec<_> = v.chunks_rev().map(|c| (c.start, c.items.to_vec())).collect();
    assert_eq!(
        rev,
        vec![
            (8, vec![8, 9]),
            (4, vec![4, 5, 6, 7]),
            (0, vec![0, 1, 2, 3])
        ]
    );
    assert_eq!(HugeList::<i32>::new().chunks_rev().count(), 0);
}

#[test]
fn test_hugelist_iterate_range() {
    let mut v: HugeList<i32> = HugeList::with_block_size(3);
    v.add_range(0..10).unwrap();

    let mut x = vec![0; 12];
    v.iterate_range_with(2, 6, &mut x, 4, |a, b| {
        *b = *a;
        *a = -*a;
    })
    .unwrap();
    assert_eq!(x, vec![0, 0, 0, 0, 2, 3, 4, 5, 6, 7, 0, 0]);
    assert_eq!(v.to_vec(), vec![0, 1, -2, -3, -4, -5, -6, -7, 8, 9]);

    let mut y = vec![0; 10];
    let mut batches = 0;
    v.iterate_range_batch_with(0, 10, &mut y, 0, |a, b| {
        batches += 1;
        assert_eq!(a.len(), b.len());
        b.copy_from_slice(a);
    })
    .unwrap();
    assert_eq!(batches, v.segment_count());
    assert_eq!(y, v.to_vec());

    v.iterate_range(0, 10, |a| *a = a.abs()).unwrap();
    assert_eq!(v.to_vec(), (0..10).collect::<Vec<_>>());
    v.validate().unwrap();
}

#[test]
fn test_hugelist_remove_all() {
    let mut v = HugeList::with_block_size(5);
    v.add_range(0..200).unwrap();
    let version = v.version();
    assert_eq!(v.remove_all(|x| *x >= 1000), 0);
    assert_eq!(v.version(), version);

    assert_eq!(v.remove_all(|x| x % 4 != 0), 150);
    assert_eq!(v.to_vec(), (0..200).step_by(4).collect::<Vec<_>>());
    assert!(v.version() > version);
    v.validate().unwrap();

    assert_eq!(v.remove_all(|x| (40..120).contains(x)), 20);
    v.validate().unwrap();
    assert_eq!(v.remove_all(|_| true), 30);
    assert!(v.is_empty());
    assert_eq!(v.segment_count(), 0);
    v.validate().unwrap();
}

#[test]
fn test_hugelist_replace_range() {
    let mut v = HugeList::with_block_size(4);
    v.add_range(0..20).unwrap();
    let mut model: Vec<i32> = (0..20).collect();

    for (index, count, with) in [
        (3, 2, vec![100, 101, 102, 103, 104, 105]),
        (0, 9, vec![7]),
        (5, 0, vec![1, 2]),
        (10, 3, vec![]),
        (11, 4, vec![5, 5, 5, 5]),
    ] {
        v.replace_range(index, count, with.clone()).unwrap();
        let tail = model.split_off(index + count);
        model.truncate(index);
        model.extend(with);
        model.extend(tail);
        v.validate().unwrap();
        assert_eq!(v.to_vec(), model);
    }
}

#[test]
fn test_hugelist_search() {
    let mut rng = StdRng::seed_from_u64(7);
    let model: Vec<u8> = (0..500).map(|_| rng.gen_range(0..20)).collect();
    let mut v = HugeList::with_block_size(16);
    v.add_range(model.iter().copied()).unwrap();

    for x in 0..22u8 {
        assert_eq!(v.index_of(&x), model.iter().position(|y| *y == x));
        assert_eq!(v.last_index_of(&x), model.iter().rposition(|y| *y == x));
    }
    for _ in 0..200 {
        let index = rng.gen_range(0..=model.len());
        let count = rng.gen_range(0..=model.len() - index);
        let range = &model[index..index + count];
        let x = rng.gen_range(0..20);
        let any = [x, (x + 7) % 20];

        assert_eq!(
            v.index_of_range(&x, index, count).unwrap(),
            range.iter().position(|y| *y == x).map(|p| p + index)
        );
        assert_eq!(
            v.last_index_of_range(&x, index, count).unwrap(),
            range.iter().rposition(|y| *y == x).map(|p| p + index)
        );
        assert_eq!(
            v.index_of_any(&any, index, count).unwrap(),
            range.iter().position(|y| any.contains(y)).map(|p| p + index)
        );
        assert_eq!(
            v.last_index_of_any(&any, index, count).unwrap(),
            range.iter().rposition(|y| any.contains(y)).map(|p| p + index)
        );
        assert_eq!(
            v.find_index_range(index, count, |y| *y > x).unwrap(),
            range.iter().position(|y| *y > x).map(|p| p + index)
        );
        assert_eq!(
            v.find_last_index_range(index, count, |y| *y > x).unwrap(),
            range.iter().rposition(|y| *y > x).map(|p| p + index)
        );
    }
    assert_eq!(v.find_index(|y| *y == 19), model.iter().position(|y| *y == 19));
    assert_eq!(
        v.find_last_index(|y| *y == 0),
        model.iter().rposition(|y| *y == 0)
    );
}

#[test]
fn test_hugelist_binary_search() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut model: Vec<u32> = (0..1000).map(|_| rng.gen_range(0..300)).collect();
    model.sort();
    let v: HugeList<u32> = model.iter().copied().collect();

    for needle in 0..310u32 {
        let insertion = model.partition_point(|x| *x < needle);
        match v.binary_search(&needle) {
            Ok(i) => assert_eq!(model[i], needle),
            Err(i) => {
                assert_eq!(i, insertion);
                assert!(!model.contains(&needle));
            }
        }
        let first = v
            .binary_search_range(0, v.len(), |x| x.cmp(&needle), Duplicates::First)
            .unwrap();
        if model.contains(&needle) {
            assert_eq!(first, Ok(insertion));
        } else {
            assert_eq!(first, Err(insertion));
        }
        assert_eq!(
            v.binary_search_by_key(&(needle * 2), |x| x * 2).is_ok(),
            model.contains(&needle)
        );
    }

    let found = v
        .binary_search_range(100, 50, |x| x.cmp(&model[120]), Duplicates::First)
        .unwrap();
    let expected = 100 + model[100..150].partition_point(|x| *x < model[120]);
    assert_eq!(found, Ok(expected));
}

#[test]
fn test_hugelist_cursor() {
    let mut v: HugeList<i32> = (0..10).collect();
    let mut strict = v.cursor(CursorMode::Strict);
    let mut robust = v.cursor(CursorMode::Robust);
    for i in 0..3 {
        assert_eq!(strict.next(&v).unwrap(), Some(&i));
        assert_eq!(robust.next(&v).unwrap(), Some(&i));
    }

    // in-place writes are not structural
    v.set(5, 50).unwrap();
    assert_eq!(strict.next(&v).unwrap(), Some(&3));
    assert_eq!(robust.next(&v).unwrap(), Some(&3));

    let expected = v.version();
    v.remove_at(0).unwrap();
    assert_eq!(
        strict.next(&v),
        Err(HugeListError::ConcurrentModification {
            expected,
            found: v.version()
        })
    );
    assert_eq!(robust.next(&v).unwrap(), Some(&50));
    let mut rest = Vec::new();
    while let Some(x) = robust.next(&v).unwrap() {
        rest.push(*x);
    }
    assert_eq!(rest, vec![6, 7, 8, 9]);
    assert_eq!(robust.next(&v).unwrap(), None);

    strict.reset(&v);
    assert_eq!(strict.index(), 0);
    assert_eq!(strict.next(&v).unwrap(), Some(&1));
}

#[test]
fn test_hugelist_cursor_chunks() {
    let mut v = HugeList::with_block_size(4);
    v.add_range(0..10).unwrap();
    let mut c = Cursor::new(&v, CursorMode::Strict);
    assert_eq!(c.next(&v).unwrap(), Some(&0));
    assert_eq!(c.next_chunk(&v).unwrap().map(|c| c.items), Some(&[1, 2, 3][..]));
    assert_eq!(c.next_chunk(&v).unwrap().map(|c| c.start), Some(4));
    assert_eq!(c.next(&v).unwrap(), Some(&8));
    assert_eq!(c.next_chunk(&v).unwrap().map(|c| c.items), Some(&[9][..]));
    assert!(c.next_chunk(&v).unwrap().is_none());
}

#[test]
fn test_hugelist_reads_keep_layout() {
    let mut v = HugeList::with_block_size(8);
    v.add_range(0..50).unwrap();
    v.insert_range(13, 0..5).unwrap();
    v.remove_range(30, 3).unwrap();
    let dump = v.dump();

    for _ in 0..3 {
        assert!(v.validate().is_ok());
        let _ = v.get(17);
        let _ = v.index_of(&40);
        let _ = v.last_index_of(&2);
        let _ = v.iter().count();
        let _ = v.chunks().count();
        let _ = v.to_vec();
        let mut buf = vec![0; 10];
        v.copy_to(20, &mut buf, 0, 10).unwrap();
        let _ = v.cursor(CursorMode::Strict).next(&v);
    }
    assert_eq!(v.dump(), dump);
}

#[test]
fn test_hugelist_round_trip() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut v = HugeList::with_block_size(32);
    for _ in 0..2000 {
        let index = rng.gen_range(0..=v.len());
        v.insert(index, rng.gen::<u64>()).unwrap();
    }
    let items = v.to_vec();
    let mut w = HugeList::with_block_size(32);
    w.insert_range(0, items.clone()).unwrap();
    assert_eq!(w, v);
    w.validate().unwrap();

    v.clear();
    assert!(v.is_empty());
    v.insert_range(0, items.clone()).unwrap();
    assert_eq!(v.to_vec(), items);
    v.validate().unwrap();
}

#[test]
fn test_hugelist_segment_count_bound() {
    let mut rng = StdRng::seed_from_u64(5);
    for block in [1, 2, 5, 16, 64] {
        let mut v = HugeList::with_block_size(block);
        for i in 0..3000 {
            let index = rng.gen_range(0..=v.len());
            v.insert(index, i).unwrap();
            if i % 7 == 0 {
                let index = rng.gen_range(0..v.len());
                v.remove_at(index).unwrap();
            }
        }
        v.validate().unwrap();
        assert!(
            v.segment_count() <= 2 * v.len() / block + 1,
            "{} segments for {} items in blocks of {}",
            v.segment_count(),
            v.len(),
            block
        );
    }
}

#[test]
fn test_hugelist_zero_sized() {
    let mut v: HugeList<()> = HugeList::with_block_size(4);
    v.insert_default(0, 10).unwrap();
    v.remove_range(3, 4).unwrap();
    v.insert(1, ()).unwrap();
    assert_eq!(v.len(), 7);
    assert_eq!(v.iter().count(), 7);
    v.validate().unwrap();
}

#[test]
fn test_hugelist_from_iter() {
    let v = (0..600).collect::<HugeList<_>>();
    assert_eq!(v.len(), 600);
    assert_eq!(v.segment_count(), 2);
    assert_eq!(format!("{:?}", (0..3).collect::<HugeList<i32>>()), "[0, 1, 2]");
}

#[test]
fn test_hugelist_hash_eq_clone() {
    let a: HugeList<i32> = (0..100).collect();
    let mut b = HugeList::with_map(VecRangeMap::new(), 7).unwrap();
    b.add_range(0..100).unwrap();
    assert!(a == b);

    let mut h1 = DefaultHasher::new();
    a.hash(&mut h1);
    let mut h2 = DefaultHasher::new();
    b.hash(&mut h2);
    assert_eq!(h1.finish(), h2.finish());

    let c = b.clone();
    assert_eq!(c.dump(), b.dump());
    c.validate().unwrap();
    assert!(c == b);
    b.push(100);
    assert!(c != b);
}

#[test]
fn test_hugelist_extend() {
    let mut v = HugeList::with_block_size(2);
    v.extend([1, 2, 3, 4, 5]);
    assert_eq!(v.len(), 5);
    assert_eq!(v.segment_count(), 3);
    assert_eq!(v.into_iter().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
}

#[derive(Debug, PartialEq)]
struct Bomb(i32);

impl Clone for Bomb {
    fn clone(&self) -> Self {
        if self.0 == 99 {
            panic!("cannot clone {}", self.0);
        }
        Bomb(self.0)
    }
}

impl Default for Bomb {
    fn default() -> Self {
        panic!("no default");
    }
}

#[test]
fn test_hugelist_panicking_clone_keeps_items() {
    let mut v: HugeList<Bomb> = HugeList::with_block_size(4);
    v.add_range((0..8).map(Bomb)).unwrap();
    let dump = v.dump();
    let version = v.version();
    let source = [Bomb(50), Bomb(99)];

    let res = catch_unwind(AssertUnwindSafe(|| v.insert_slice(2, &source, 0, 2)));
    assert!(res.is_err());
    let res = catch_unwind(AssertUnwindSafe(|| v.replace_slice(1, 1, &source, 0, 2)));
    assert!(res.is_err());
    let res = catch_unwind(AssertUnwindSafe(|| v.insert_default(5, 3)));
    assert!(res.is_err());

    v.validate().unwrap();
    assert_eq!(v.dump(), dump);
    assert_eq!(v.version(), version);
    assert!(v.iter().map(|b| b.0).eq(0..8));

    v.insert_slice(2, &source, 0, 1).unwrap();
    assert_eq!(v.len(), 9);
    assert_eq!(v[2], Bomb(50));
    v.validate().unwrap();
}

#[test]
fn test_hugelist_panicking_predicate() {
    let mut v: HugeList<i32> = HugeList::with_block_size(4);
    v.add_range(0..20).unwrap();
    let version = v.version();

    let res = catch_unwind(AssertUnwindSafe(|| {
        v.remove_all(|&x| {
            if x == 13 {
                panic!("rejecting {}", x);
            }
            x % 2 == 0
        })
    }));
    assert!(res.is_err());

    // segments before the one holding 13 were compacted, the rest is untouched
    v.validate().unwrap();
    assert_eq!(
        v.to_vec(),
        vec![1, 3, 5, 7, 9, 11, 12, 13, 14, 15, 16, 17, 18, 19]
    );
    assert_eq!(v.version(), version + 1);

    assert_eq!(v.remove_all(|&x| x % 2 == 0), 4);
    assert_eq!(v.to_vec(), (1..20).step_by(2).collect::<Vec<_>>());
    v.validate().unwrap();
}

fn random_ops<M>(block: usize, seed: u64, steps: usize)
where
    M: RangeMap<Block<u32>> + Default,
{
    let mut rng = StdRng::seed_from_u64(seed);
    let mut v = HugeList::with_map(M::default(), block).unwrap();
    let mut model: Vec<u32> = Vec::new();

    for step in 0..steps {
        let len = model.len();
        match rng.gen_range(0..20) {
            0..=5 => {
                let index = rng.gen_range(0..=len);
                let count = rng.gen_range(0..=3 * block);
                let items: Vec<u32> = (0..count).map(|_| rng.gen_range(0..50)).collect();
                v.insert_range(index, items.iter().copied()).unwrap();
                let tail = model.split_off(index);
                model.extend(items);
                model.extend(tail);
            }
            6 | 7 => {
                let index = rng.gen_range(0..=len);
                let x = rng.gen_range(0..50);
                v.insert(index, x).unwrap();
                model.insert(index, x);
            }
            8..=11 if len > 0 => {
                let index = rng.gen_range(0..len);
                let count = rng.gen_range(0..=(len - index).min(3 * block));
                v.remove_range(index, count).unwrap();
                model.drain(index..index + count);
            }
            12 if len > 0 => {
                let index = rng.gen_range(0..len);
                assert_eq!(v.remove_at(index).unwrap(), model.remove(index));
            }
            13 | 14 => {
                let index = rng.gen_range(0..=len);
                let count = rng.gen_range(0..=(len - index).min(2 * block));
                let items: Vec<u32> = (0..rng.gen_range(0..=2 * block))
                    .map(|_| rng.gen_range(0..50))
                    .collect();
                v.replace_range(index, count, items.clone()).unwrap();
                let tail = model.split_off(index + count);
                model.truncate(index);
                model.extend(items);
                model.extend(tail);
            }
            15 if len > 0 => {
                let index = rng.gen_range(0..len);
                let x = rng.gen_range(0..50);
                assert_eq!(v.set(index, x).unwrap(), model[index]);
                model[index] = x;
            }
            16 => {
                let k = rng.gen_range(5..50);
                let before = model.len();
                model.retain(|x| x % k != 0);
                assert_eq!(v.remove_all(|x| x % k == 0), before - model.len());
            }
            17 if len > 0 => {
                let cut = len - rng.gen_range(0..=len.min(block));
                v.truncate(cut);
                model.truncate(cut);
            }
            _ => {
                let x = rng.gen_range(0..50);
                assert_eq!(v.index_of(&x), model.iter().position(|y| *y == x));
                assert_eq!(v.last_index_of(&x), model.iter().rposition(|y| *y == x));
                if len > 0 {
                    let index = rng.gen_range(0..len);
                    assert_eq!(v[index], model[index]);
                }
            }
        }
        if let Err(e) = v.validate() {
            panic!("step {}: {}", step, e);
        }
        assert_eq!(v.len(), model.len());
        if step % 16 == 0 {
            assert_eq!(v.to_vec(), model);
        }
    }
    assert_eq!(v.to_vec(), model);
    assert!(v.iter().eq(model.iter()));
    assert!(v.iter().rev().eq(model.iter().rev()));
}

#[test]
fn test_hugelist_random_ops() {
    for (i, block) in [1, 2, 3, 4, 7, 16].into_iter().enumerate() {
        random_ops::<AvlRangeMap<Block<u32>>>(block, 0xC0FFEE + i as u64, 2000);
    }
}

#[test]
fn test_hugelist_random_ops_vec_map() {
    for (i, block) in [2, 5, 9].into_iter().enumerate() {
        random_ops::<VecRangeMap<Block<u32>>>(block, 0xBEEF + i as u64, 1500);
    }
}

mod proptests {
    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Insert(usize, Vec<u8>),
        Remove(usize, usize),
        Replace(usize, usize, Vec<u8>),
        RemoveAll(u8),
        Set(usize, u8),
        Truncate(usize),
        Pop,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (any::<usize>(), vec(any::<u8>(), 0..24)).prop_map(|(i, v)| Op::Insert(i, v)),
            2 => (any::<usize>(), any::<usize>()).prop_map(|(i, n)| Op::Remove(i, n)),
            2 => (any::<usize>(), any::<usize>(), vec(any::<u8>(), 0..12))
                .prop_map(|(i, n, v)| Op::Replace(i, n, v)),
            1 => (2u8..16).prop_map(Op::RemoveAll),
            1 => (any::<usize>(), any::<u8>()).prop_map(|(i, x)| Op::Set(i, x)),
            1 => any::<usize>().prop_map(Op::Truncate),
            1 => Just(Op::Pop),
        ]
    }

    proptest! {
        #[test]
        fn ops_match_vec(block in 1usize..9, ops in vec(op(), 1..64)) {
            let mut v = HugeList::with_block_size(block);
            let mut model: Vec<u8> = Vec::new();
            for op in ops {
                let len = model.len();
                match op {
                    Op::Insert(i, items) => {
                        let index = i % (len + 1);
                        v.insert_range(index, items.clone()).unwrap();
                        let tail = model.split_off(index);
                        model.extend(items);
                        model.extend(tail);
                    }
                    Op::Remove(i, n) => {
                        let index = i % (len + 1);
                        let count = n % (len - index + 1);
                        v.remove_range(index, count).unwrap();
                        model.drain(index..index + count);
                    }
                    Op::Replace(i, n, items) => {
                        let index = i % (len + 1);
                        let count = n % (len - index + 1);
                        v.replace_range(index, count, items.clone()).unwrap();
                        let tail = model.split_off(index + count);
                        model.truncate(index);
                        model.extend(items);
                        model.extend(tail);
                    }
                    Op::RemoveAll(k) => {
                        let removed = v.remove_all(|x| x % k == 0);
                        let before = model.len();
                        model.retain(|x| x % k != 0);
                        prop_assert_eq!(removed, before - model.len());
                    }
                    Op::Set(i, x) if len > 0 => {
                        v[i % len] = x;
                        model[i % len] = x;
                    }
                    Op::Set(..) => {}
                    Op::Truncate(n) => {
                        let cut = n % (len + 1);
                        v.truncate(cut);
                        model.truncate(cut);
                    }
                    Op::Pop => {
                        prop_assert_eq!(v.pop(), model.pop());
                    }
                }
                prop_assert!(v.validate().is_ok(), "{}", v.dump());
                prop_assert_eq!(v.to_vec(), model.clone());
            }
        }
    }
}
