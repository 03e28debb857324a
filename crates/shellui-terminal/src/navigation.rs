//! Bounded index stepping shared by character selection and history
//! browsing.
//!
//! `None` means "past the end": no character selected, or not browsing
//! history.

use std::str::FromStr;

/// Step direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards older entries / the start of the line (`left`, `top`).
    Previous,
    /// Towards newer entries / the end of the line (`right`, `bottom`).
    Next,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" | "top" | "up" | "previous" => Ok(Self::Previous),
            "right" | "bottom" | "down" | "next" => Ok(Self::Next),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// Outcome of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing to do.
    Stay,
    /// Move to this index (`None` leaves selection / browsing).
    MoveTo(Option<usize>),
}

impl Step {
    /// The index after applying this step to `current`.
    pub fn apply(self, current: Option<usize>) -> Option<usize> {
        match self {
            Self::Stay => current,
            Self::MoveTo(index) => index,
        }
    }
}

/// Step `current` one position in `direction` over `length` items.
pub fn step(length: usize, current: Option<usize>, direction: Direction) -> Step {
    if length == 0 {
        return Step::Stay;
    }
    match (direction, current) {
        (Direction::Previous, None) => Step::MoveTo(Some(length - 1)),
        (Direction::Previous, Some(i)) if i > 0 => Step::MoveTo(Some(i - 1)),
        (Direction::Previous, Some(_)) => Step::Stay,
        (Direction::Next, Some(i)) if i + 1 < length => Step::MoveTo(Some(i + 1)),
        (Direction::Next, _) => Step::MoveTo(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_from_none_goes_to_last() {
        assert_eq!(step(3, None, Direction::Previous), Step::MoveTo(Some(2)));
    }

    #[test]
    fn previous_walks_back() {
        assert_eq!(step(3, Some(2), Direction::Previous), Step::MoveTo(Some(1)));
    }

    #[test]
    fn previous_at_zero_stays() {
        assert_eq!(step(3, Some(0), Direction::Previous), Step::Stay);
        assert_eq!(step(3, Some(0), Direction::Previous).apply(Some(0)), Some(0));
    }

    #[test]
    fn next_from_last_leaves() {
        assert_eq!(step(3, Some(2), Direction::Next), Step::MoveTo(None));
    }

    #[test]
    fn next_walks_forward() {
        assert_eq!(step(3, Some(0), Direction::Next), Step::MoveTo(Some(1)));
    }

    #[test]
    fn next_from_none_stays_none() {
        assert_eq!(step(3, None, Direction::Next), Step::MoveTo(None));
    }

    #[test]
    fn empty_is_noop() {
        assert_eq!(step(0, None, Direction::Previous), Step::Stay);
        assert_eq!(step(0, None, Direction::Next), Step::Stay);
    }

    #[test]
    fn direction_names() {
        for name in ["left", "top", "up", "previous"] {
            assert_eq!(name.parse::<Direction>().unwrap(), Direction::Previous);
        }
        for name in ["right", "bottom", "down", "next"] {
            assert_eq!(name.parse::<Direction>().unwrap(), Direction::Next);
        }
        assert!("sideways".parse::<Direction>().is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn direction() -> impl Strategy<Value = Direction> {
            prop_oneof![Just(Direction::Previous), Just(Direction::Next)]
        }

        proptest! {
            #[test]
            fn index_stays_in_bounds(
                length in 1usize..20,
                moves in proptest::collection::vec(direction(), 0..40),
            ) {
                let mut index = None;
                for d in moves {
                    index = step(length, index, d).apply(index);
                    if let Some(i) = index {
                        prop_assert!(i < length);
                    }
                }
            }

            #[test]
            fn previous_then_next_returns(length in 2usize..20, start in 1usize..20) {
                let start = start % length;
                prop_assume!(start > 0);
                let back = step(length, Some(start), Direction::Previous).apply(Some(start));
                let forward = step(length, back, Direction::Next).apply(back);
                prop_assert_eq!(forward, Some(start));
            }
        }
    }
}
