use std::collections::HashSet;

use super::*;

#[test]
fn test_scaled_to_coarser_zoom() {
  let coord = TileCoordinate::new(10, 5, 7);

  assert_eq!(coord.scaled_to(10), Some(coord));
  assert_eq!(coord.scaled_to(9), Some(TileCoordinate::new(9, 2, 3)));
  assert_eq!(coord.scaled_to(8), Some(TileCoordinate::new(8, 1, 1)));
  assert_eq!(coord.scaled_to(0), Some(TileCoordinate::new(0, 0, 0)));
}

#[test]
fn test_scaled_to_finer_zoom_is_none() {
  let coord = TileCoordinate::new(4, 3, 3);
  assert!(coord.scaled_to(5).is_none());
}

#[test]
fn test_scaled_to_keeps_wrap() {
  let coord = TileCoordinate::new(3, 6, 2).with_wrap(-1);
  let parent = coord.scaled_to(1).unwrap();
  assert_eq!(parent.wrap, -1);
}

#[test]
fn test_parent_chain_reaches_root() {
  let mut coord = TileCoordinate::new(6, 40, 21);
  let mut steps = 0;
  while let Some(parent) = coord.parent() {
    assert_eq!(parent.zoom, coord.zoom - 1);
    coord = parent;
    steps += 1;
  }
  assert_eq!(steps, 6);
  assert_eq!(coord, TileCoordinate::new(0, 0, 0));
}

#[test]
fn test_is_ancestor_of() {
  let child = TileCoordinate::new(5, 17, 9);
  let grandparent = TileCoordinate::new(3, 4, 2);
  let unrelated = TileCoordinate::new(3, 5, 2);

  assert!(grandparent.is_ancestor_of(&child));
  assert!(!unrelated.is_ancestor_of(&child));
  assert!(!child.is_ancestor_of(&child), "A tile is not its own ancestor");
  assert!(!child.is_ancestor_of(&grandparent));
  assert!(!grandparent.with_wrap(1).is_ancestor_of(&child));
}

#[test]
fn test_coordinates_hash_by_value() {
  let mut set = HashSet::new();
  set.insert(TileCoordinate::new(2, 1, 1));
  set.insert(TileCoordinate::new(2, 1, 1));
  set.insert(TileCoordinate::new(2, 1, 1).with_wrap(1));
  assert_eq!(set.len(), 2);
}

#[test]
fn test_display() {
  assert_eq!(TileCoordinate::new(3, 2, 1).to_string(), "3/2/1");
  assert_eq!(TileCoordinate::new(3, 2, 1).with_wrap(-2).to_string(), "3/2/1@-2");
}
