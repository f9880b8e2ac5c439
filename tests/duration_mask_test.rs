//! Tests for duration validity masks

use casemix::domain::{mask_to_ranges, nights, ranges_describe_same_set, DomainError, DurationMask};

#[test]
fn given_contiguous_low_bits_when_describing_then_single_range() {
    assert_eq!(mask_to_ranges(0b1111), "0-3");
}

#[test]
fn given_open_ended_bit_when_describing_then_uses_at_least_notation() {
    // Arrange: same night plus every stay of 31 nights or more
    let mask = DurationMask::from_bits([0, 31]).unwrap();

    // Act
    let text = mask_to_ranges(mask.0);

    // Assert
    assert_eq!(text, "0, ≥ 31");
    assert!(mask.allows(0));
    assert!(!mask.allows(1));
    assert!(mask.allows(90));
}

#[test]
fn given_empty_mask_when_describing_then_empty_text() {
    assert_eq!(mask_to_ranges(0), "");
    assert!(DurationMask::EMPTY.is_empty());
}

#[test]
fn given_equal_sets_when_compared_then_describe_same_set() {
    let a = DurationMask::from_bits([3, 1, 2]).unwrap();

    assert!(ranges_describe_same_set(a.0, 0b1110));
    assert!(!ranges_describe_same_set(a.0, 0b1111));
}

#[test]
fn given_invalid_caller_input_when_validating_then_invalid_argument() {
    assert!(matches!(nights(-3), Err(DomainError::InvalidArgument(_))));
    assert!(matches!(
        DurationMask::ALL.has_bit(32),
        Err(DomainError::InvalidArgument(_))
    ));
}
