//! List-shape matchers

use super::{Matcher, Mismatch, Tree, View};

/// Matches a non-empty list whose first element matches `first` and whose
/// remaining elements (as a [`View::Seq`]) match `rest`.
pub fn list_first<'t, T, F, R>(first: F, rest: R) -> ListFirst<F, R>
where
    T: Tree,
    F: Matcher<'t, T>,
    R: Matcher<'t, T>,
{
    ListFirst { first, rest }
}

/// Like [`list_first`], but `last` matches the final element and `rest`
/// everything before it.
pub fn list_last<'t, T, L, R>(last: L, rest: R) -> ListLast<L, R>
where
    T: Tree,
    L: Matcher<'t, T>,
    R: Matcher<'t, T>,
{
    ListLast { last, rest }
}

/// Matches a list with exactly one element per matcher.
pub fn list<'t, 'm, T: Tree>(items: Vec<Box<dyn Matcher<'t, T> + 'm>>) -> List<'t, 'm, T> {
    List { items }
}

/// See [`list_first`].
#[derive(Debug, Clone)]
pub struct ListFirst<F, R> {
    first: F,
    rest: R,
}

impl<'t, T: Tree, F: Matcher<'t, T>, R: Matcher<'t, T>> Matcher<'t, T> for ListFirst<F, R> {
    fn check(&self, view: View<'t, T>) -> Result<(), Mismatch> {
        let items = view.list().ok_or(Mismatch::NotList)?;
        let (head, tail) = items.split_first().ok_or(Mismatch::EmptyList)?;
        self.first.check(View::Node(head))?;
        self.rest.check(View::Seq(tail))
    }
}

/// See [`list_last`].
#[derive(Debug, Clone)]
pub struct ListLast<L, R> {
    last: L,
    rest: R,
}

impl<'t, T: Tree, L: Matcher<'t, T>, R: Matcher<'t, T>> Matcher<'t, T> for ListLast<L, R> {
    fn check(&self, view: View<'t, T>) -> Result<(), Mismatch> {
        let items = view.list().ok_or(Mismatch::NotList)?;
        let (last, init) = items.split_last().ok_or(Mismatch::EmptyList)?;
        self.last.check(View::Node(last))?;
        self.rest.check(View::Seq(init))
    }
}

/// See [`list`].
pub struct List<'t, 'm, T> {
    items: Vec<Box<dyn Matcher<'t, T> + 'm>>,
}

impl<'t, T: Tree> Matcher<'t, T> for List<'t, '_, T> {
    fn check(&self, view: View<'t, T>) -> Result<(), Mismatch> {
        let values = view.list().ok_or(Mismatch::NotList)?;
        if values.len() != self.items.len() {
            return Err(Mismatch::LengthMismatch {
                expected: self.items.len(),
                got: values.len(),
            });
        }
        self.items
            .iter()
            .zip(values)
            .try_for_each(|(item, value)| item.check(View::Node(value)))
    }
}
