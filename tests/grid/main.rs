//! Grid slot allocation over the honeycomb layout.

use kkultip_sync::grid::{allocate, presets, total_slots, DecorMap, DecorSlot, GridConfig, Slot};

fn decor_at(indices: &[usize]) -> DecorMap {
    indices
        .iter()
        .map(|&i| (i, DecorSlot::image("/img/1bee.png")))
        .collect()
}

#[test]
fn seven_items_around_two_decorations() {
    let decor = decor_at(&[4, 5]);
    let items = vec!["a", "b", "c", "d", "e", "f", "g"];
    let grid = allocate(items, &decor, &GridConfig::new(5, 30)).unwrap();

    assert_eq!(grid.total_slots(), 30);
    assert_eq!(grid.rows(), 6);
    assert!(grid.slot(4).unwrap().is_decor());
    assert!(grid.slot(5).unwrap().is_decor());

    let placed: Vec<(usize, &str)> = grid
        .slots()
        .iter()
        .filter_map(|s| s.item().map(|item| (s.index(), *item)))
        .collect();
    assert_eq!(
        placed,
        vec![(1, "a"), (2, "b"), (3, "c"), (6, "d"), (7, "e"), (8, "f"), (9, "g")]
    );
    assert_eq!(grid.slot(10), Some(&Slot::Data { index: 10, item: None }));
    for index in 11..=30 {
        assert_eq!(grid.slot(index).unwrap().item(), None);
        assert!(!grid.slot(index).unwrap().is_decor());
    }
}

#[test]
fn layout_invariants_hold_across_sizes() {
    let decor = decor_at(&[2, 9, 13]);
    for columns in 1..=7 {
        for n in 0..60 {
            let config = GridConfig::new(columns, 12);
            let grid = allocate(0..n, &decor, &config).unwrap();
            let total = grid.total_slots();

            assert_eq!(total % columns, 0, "n={} columns={}", n, columns);
            assert!(total >= 13);
            assert_eq!(grid.data_count(), n);

            // Items land in arrival order, never on a decoration.
            let order: Vec<usize> = grid.slots().iter().filter_map(|s| s.item().copied()).collect();
            assert_eq!(order, (0..n).collect::<Vec<_>>());
            for &i in decor.keys() {
                assert!(grid.slot(i).unwrap().is_decor());
            }
        }
    }
}

#[test]
fn columns_interleave_for_the_honeycomb() {
    let decor = DecorMap::new();
    let grid = allocate(1..=10, &decor, &GridConfig::new(5, 10)).unwrap();
    let columns = grid.columns();
    assert_eq!(columns.len(), 5);
    let first: Vec<usize> = columns[0].iter().map(|s| s.index()).collect();
    assert_eq!(first, vec![1, 6]);
    let shifted: Vec<bool> = (0..5).map(|j| grid.is_shifted(j)).collect();
    assert_eq!(shifted, vec![true, false, true, false, true]);
}

#[test]
fn mytip_preset_fills_around_bees() {
    let decor = presets::mytip();
    let config = GridConfig::default();

    assert_eq!(total_slots(25, &decor, &config).unwrap(), 30);
    assert_eq!(total_slots(26, &decor, &config).unwrap(), 35);

    let grid = allocate(0..26, &decor, &config).unwrap();
    let decorations: Vec<usize> = grid
        .slots()
        .iter()
        .filter(|s| s.is_decor())
        .map(Slot::index)
        .collect();
    assert_eq!(decorations, vec![4, 5, 10, 11, 16]);
    assert_eq!(grid.slot(6).unwrap().item(), Some(&3));
}

#[test]
fn decor_map_reads_from_json() {
    let decor: DecorMap = serde_json::from_str(
        r#"{ "4": { "src": "/img/1bee.png", "width": "w-[80%]", "height": "h-[80%]", "top": "b-[-20%]", "z": 5 } }"#,
    )
    .unwrap();
    assert!(decor[&4].has_image());
    assert_eq!(decor[&4].left, None);
}
