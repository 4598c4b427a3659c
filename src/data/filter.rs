use super::model::{Dataset, Record, Selection};
use crate::error::AggregateError;

// ---------------------------------------------------------------------------
// Row filtering: the one policy every view goes through
// ---------------------------------------------------------------------------

/// Fail with [`AggregateError::InvalidSelection`] if the selected entity is
/// not part of the dataset. `All` is always valid, even on an empty dataset.
pub fn check_selection(dataset: &Dataset, selection: &Selection) -> Result<(), AggregateError> {
    match selection {
        Selection::All => Ok(()),
        Selection::Entity(name) if dataset.contains_entity(name) => Ok(()),
        Selection::Entity(name) => Err(AggregateError::InvalidSelection {
            entity: name.clone(),
        }),
    }
}

/// Return the records that pass the selection, in input order.
///
/// A record passes when:
/// * `period` is `None`, or the record's period equals it
/// * the selection is `All`, or the record belongs to the selected entity
pub fn select_rows<'a>(
    dataset: &'a Dataset,
    selection: &Selection,
    period: Option<i32>,
) -> Result<Vec<&'a Record>, AggregateError> {
    check_selection(dataset, selection)?;

    let rows = dataset
        .records()
        .iter()
        .filter(|rec| period.map_or(true, |p| rec.period == p))
        .filter(|rec| match selection {
            Selection::All => true,
            Selection::Entity(name) => rec.entity == *name,
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            record("Chad", "Africa", 2002, 50.5, 9.0e6),
            record("Norway", "Europe", 2002, 79.0, 4.5e6),
            record("Chad", "Africa", 2007, 50.7, 1.0e7),
            record("Norway", "Europe", 2007, 80.2, 4.6e6),
        ])
        .unwrap()
    }

    #[test]
    fn test_all_without_period_keeps_everything() {
        let ds = dataset();
        let rows = select_rows(&ds, &Selection::All, None).unwrap();
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn test_period_then_entity() {
        let ds = dataset();
        let rows = select_rows(&ds, &Selection::entity("Norway"), Some(2007)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entity, "Norway");
        assert_eq!(rows[0].period, 2007);
    }

    #[test]
    fn test_input_order_is_kept() {
        let ds = dataset();
        let rows = select_rows(&ds, &Selection::All, Some(2002)).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(names, ["Chad", "Norway"]);
    }

    #[test]
    fn test_unknown_entity_fails() {
        let ds = dataset();
        let err = select_rows(&ds, &Selection::entity("Xanadu"), None).unwrap_err();
        assert_eq!(
            err,
            AggregateError::InvalidSelection {
                entity: "Xanadu".into()
            }
        );
    }

    #[test]
    fn test_known_entity_at_missing_period_is_empty_not_error() {
        let ds = dataset();
        let rows = select_rows(&ds, &Selection::entity("Chad"), Some(1952)).unwrap();
        assert!(rows.is_empty());
    }
}
