//! Category display ordering rules.
//!
//! Categories are ranked by an optional `sort_order` column. Unranked
//! categories sort last; ties break on name. The same comparator is used
//! for project and document categories.

use crate::types::DbId;

/// The fields ordering cares about, decoupled from the row structs.
pub trait Ranked {
    fn sort_order(&self) -> Option<i32>;
    fn name(&self) -> &str;
}

/// A minimal ranked category, used by the editor and by tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRank {
    pub id: DbId,
    pub name: String,
    pub sort_order: Option<i32>,
}

impl Ranked for CategoryRank {
    fn sort_order(&self) -> Option<i32> {
        self.sort_order
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Sort a category list in display order: `sort_order` ascending with
/// unranked entries last, then name ascending.
pub fn sort_for_display<T: Ranked>(items: &mut [T]) {
    items.sort_by(|a, b| {
        let oa = a.sort_order().unwrap_or(i32::MAX);
        let ob = b.sort_order().unwrap_or(i32::MAX);
        oa.cmp(&ob).then_with(|| a.name().cmp(b.name()))
    });
}

/// Default sort position for a newly created category:
/// `max(existing sort_order) + 1`, or 1 when no categories exist.
/// Unranked entries count as 0.
pub fn next_sort_order<T: Ranked>(items: &[T]) -> i32 {
    items
        .iter()
        .map(|c| c.sort_order().unwrap_or(0))
        .max()
        .map(|max| max + 1)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(id: DbId, name: &str, sort_order: Option<i32>) -> CategoryRank {
        CategoryRank {
            id,
            name: name.to_string(),
            sort_order,
        }
    }

    #[test]
    fn empty_list_starts_at_one() {
        let items: Vec<CategoryRank> = vec![];
        assert_eq!(next_sort_order(&items), 1);
    }

    #[test]
    fn next_order_is_max_plus_one() {
        // Matches the gap case: {1, 3} -> next is 4.
        let items = vec![cat(1, "Bolig", Some(1)), cat(2, "Næring", Some(3))];
        assert_eq!(next_sort_order(&items), 4);
    }

    #[test]
    fn unranked_entries_count_as_zero_for_next_order() {
        let items = vec![cat(1, "Bolig", None)];
        assert_eq!(next_sort_order(&items), 1);
    }

    #[test]
    fn display_order_ranks_then_names() {
        let mut items = vec![
            cat(3, "Hotell", Some(4)),
            cat(2, "Næring", Some(3)),
            cat(1, "Bolig", Some(1)),
        ];
        sort_for_display(&mut items);
        let names: Vec<&str> = items.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["Bolig", "Næring", "Hotell"]);
    }

    #[test]
    fn unranked_sorts_last() {
        let mut items = vec![
            cat(1, "Annet", None),
            cat(2, "Bolig", Some(2)),
            cat(3, "Tomt", None),
        ];
        sort_for_display(&mut items);
        let names: Vec<&str> = items.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["Bolig", "Annet", "Tomt"]);
    }

    #[test]
    fn ties_break_on_name() {
        let mut items = vec![cat(1, "Næring", Some(1)), cat(2, "Bolig", Some(1))];
        sort_for_display(&mut items);
        assert_eq!(items[0].name(), "Bolig");
    }
}
