//! Capturing matchers
//!
//! Each capture writes into a caller-owned `Cell` when it matches. A failed
//! match may still leave earlier captures filled in.

use std::cell::Cell;

use super::{from_fn, Matcher, Mismatch, Tree, View};

/// Matches anything and records the view.
pub fn capture<'c, 't: 'c, T: Tree>(
    slot: &'c Cell<Option<View<'t, T>>>,
) -> impl Matcher<'t, T> + 'c {
    from_fn(move |view: View<'t, T>| {
        slot.set(Some(view));
        Ok(())
    })
}

/// Matches a single node and records it.
pub fn capture_node<'c, 't: 'c, T: Tree>(
    slot: &'c Cell<Option<&'t T>>,
) -> impl Matcher<'t, T> + 'c {
    from_fn(move |view: View<'t, T>| {
        let node = view.node().ok_or(Mismatch::NoMatch)?;
        slot.set(Some(node));
        Ok(())
    })
}

/// Matches a string-like leaf and records its text.
pub fn capture_str<'c, 't: 'c, T: Tree>(
    slot: &'c Cell<Option<&'t str>>,
) -> impl Matcher<'t, T> + 'c {
    from_fn(move |view: View<'t, T>| {
        let text = view.node().and_then(Tree::as_str).ok_or(Mismatch::NotString)?;
        slot.set(Some(text));
        Ok(())
    })
}

/// Matches a number leaf and records its value.
pub fn capture_number<'c, 't, T: Tree>(slot: &'c Cell<Option<f64>>) -> impl Matcher<'t, T> + 'c {
    from_fn(move |view: View<'t, T>| {
        let n = view
            .node()
            .and_then(Tree::as_number)
            .ok_or(Mismatch::NotNumber)?;
        slot.set(Some(n));
        Ok(())
    })
}

/// Matches a boolean leaf and records its value.
pub fn capture_bool<'c, 't, T: Tree>(slot: &'c Cell<Option<bool>>) -> impl Matcher<'t, T> + 'c {
    from_fn(move |view: View<'t, T>| {
        let b = view.node().and_then(Tree::as_bool).ok_or(Mismatch::NotBool)?;
        slot.set(Some(b));
        Ok(())
    })
}

/// Matches a list (or list remainder) and records its elements.
pub fn capture_list<'c, 't: 'c, T: Tree>(
    slot: &'c Cell<Option<&'t [T]>>,
) -> impl Matcher<'t, T> + 'c {
    from_fn(move |view: View<'t, T>| {
        let items = view.list().ok_or(Mismatch::NotList)?;
        slot.set(Some(items));
        Ok(())
    })
}

/// Captures on first use, then only matches views equal to the captured
/// one.
///
/// Reusing the same `auto` matcher in several positions checks that those
/// positions hold equal values.
pub fn auto<'c, 't: 'c, T: Tree + PartialEq>(
    slot: &'c Cell<Option<View<'t, T>>>,
) -> impl Matcher<'t, T> + Copy + 'c {
    from_fn(move |view: View<'t, T>| match slot.get() {
        Some(seen) if seen == view => Ok(()),
        Some(_) => Err(Mismatch::NoMatch),
        None => {
            slot.set(Some(view));
            Ok(())
        }
    })
}
