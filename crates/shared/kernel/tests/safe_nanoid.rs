use slms_kernel::SAFE_ALPHABET;
use slms_kernel::safe_nanoid;
use std::collections::HashSet;

#[test]
fn default_ids_are_twelve_safe_characters() {
    let id = safe_nanoid!();

    assert_eq!(id.len(), 12);
    assert!(id.chars().all(|ch| SAFE_ALPHABET.contains(&ch)), "out-of-alphabet char in {id}");
}

#[test]
fn ambiguous_glyphs_never_appear() {
    for ch in ['I', 'O', 'l', '0', '1'] {
        assert!(!SAFE_ALPHABET.contains(&ch), "{ch} should be excluded");
    }

    let id = safe_nanoid!(500);
    assert!(!id.contains(['I', 'O', 'l', '0', '1']));
}

#[test]
fn length_override_is_honored() {
    assert_eq!(safe_nanoid!(21).len(), 21);
    assert_eq!(safe_nanoid!(4).len(), 4);
}

// Token jti values must stay distinct; a collision would alias two sessions.
#[test]
fn a_batch_of_ids_has_no_collisions() {
    let ids: HashSet<String> = (0..1_000).map(|_| safe_nanoid!()).collect();
    assert_eq!(ids.len(), 1_000);
}
