#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn opposite(self) -> Self {
        match self {
            Hand::Left => Hand::Right,
            Hand::Right => Hand::Left,
        }
    }
}

/// Hand that types the key in `column` of a character row.
pub fn hand_for_column(column: usize) -> Hand {
    if column <= 5 { Hand::Left } else { Hand::Right }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_split_between_hands() {
        assert_eq!(hand_for_column(1), Hand::Left);
        assert_eq!(hand_for_column(5), Hand::Left);
        assert_eq!(hand_for_column(6), Hand::Right);
        assert_eq!(Hand::Left.opposite(), Hand::Right);
        assert_eq!(Hand::Right.opposite(), Hand::Left);
    }
}
