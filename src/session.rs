use std::sync::Arc;

use serde::Serialize;

use crate::data::aggregate::{
    comparison_series, geo_series, kpis, selection_options, table_slice, trend_series,
};
use crate::data::filter::check_selection;
use crate::data::model::{Dataset, Selection};
use crate::data::views::{ComparisonSeries, GeoSeries, KpiSet, TableRow, TrendSeries};
use crate::error::AggregateError;

/// Shown in the analytics panel while nothing is drilled into.
pub const TREND_HINT: &str = "Select a country to view detailed analytics.";

// ---------------------------------------------------------------------------
// Panel – one rendered view or its placeholder
// ---------------------------------------------------------------------------

/// A derived view, or the informational text to show instead of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "content", rename_all = "snake_case")]
pub enum Panel<T> {
    Ready(T),
    Placeholder(String),
}

impl<T> Panel<T> {
    fn from_result(view: &str, result: Result<T, AggregateError>) -> Self {
        match result {
            Ok(value) => Panel::Ready(value),
            Err(e) => {
                log::warn!("{view} unavailable: {e}");
                Panel::Placeholder(e.to_string())
            }
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(value) => Some(value),
            Panel::Placeholder(_) => None,
        }
    }
}

/// Everything derived for one refresh. Built fresh each time, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub selection: Selection,
    pub reference_period: i32,
    pub options: Vec<Selection>,
    pub kpis: Panel<KpiSet>,
    pub geo: Panel<GeoSeries>,
    pub comparison: Panel<ComparisonSeries>,
    pub table: Panel<Vec<TableRow>>,
    pub trend: Panel<TrendSeries>,
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Per-session view state, passed explicitly instead of living in globals.
#[derive(Debug, Clone)]
pub struct Session {
    /// Shared with the load-once cache; never mutated here.
    dataset: Arc<Dataset>,

    selection: Selection,

    /// Year used for the point-in-time views.
    reference_period: i32,

    /// Status / error message from the last interaction.
    pub status_message: Option<String>,
}

impl Session {
    pub fn new(dataset: Arc<Dataset>, reference_period: i32) -> Self {
        Self {
            dataset,
            selection: Selection::All,
            reference_period,
            status_message: None,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn reference_period(&self) -> i32 {
        self.reference_period
    }

    /// Change the drill-down selection. Unknown entities are rejected and the
    /// previous selection stays active.
    pub fn set_selection(&mut self, selection: Selection) -> Result<(), AggregateError> {
        if let Err(e) = check_selection(&self.dataset, &selection) {
            self.status_message = Some(e.to_string());
            return Err(e);
        }
        log::debug!("Selection changed to {selection}");
        self.selection = selection;
        self.status_message = None;
        Ok(())
    }

    pub fn set_reference_period(&mut self, period: i32) {
        self.reference_period = period;
    }

    /// Swap in a freshly loaded dataset. Falls back to `All` if the selected
    /// entity is no longer present.
    pub fn replace_dataset(&mut self, dataset: Arc<Dataset>) {
        self.dataset = dataset;
        if check_selection(&self.dataset, &self.selection).is_err() {
            log::info!("{} no longer in dataset, resetting selection", self.selection);
            self.selection = Selection::All;
        }
    }

    /// Recompute every view for the current selection.
    pub fn refresh(&self) -> Dashboard {
        let ds = self.dataset.as_ref();
        let sel = &self.selection;
        let period = self.reference_period;

        let trend = match trend_series(ds, sel) {
            Ok(Some(trend)) => Panel::Ready(trend),
            Ok(None) => Panel::Placeholder(TREND_HINT.to_string()),
            Err(e) => Panel::from_result("trend", Err(e)),
        };

        Dashboard {
            selection: sel.clone(),
            reference_period: period,
            options: selection_options(ds),
            kpis: Panel::from_result("kpis", kpis(ds, sel, period)),
            geo: Panel::from_result("map", geo_series(ds, sel)),
            comparison: Panel::from_result("bar chart", comparison_series(ds, sel, period)),
            table: Panel::from_result("table", table_slice(ds, sel, period)),
            trend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn session() -> Session {
        let ds = Dataset::from_records(vec![
            record("Chad", "Africa", 2002, 50.5, 9.0e6),
            record("Chad", "Africa", 2007, 50.7, 1.0e7),
            record("Iraq", "Asia", 2002, 57.0, 2.4e7),
        ])
        .unwrap();
        Session::new(Arc::new(ds), 2007)
    }

    #[test]
    fn test_refresh_all() {
        let s = session();
        let dash = s.refresh();
        assert_eq!(dash.options.len(), 3);
        assert!(matches!(
            dash.kpis.ready(),
            Some(KpiSet::Overview { total_records: 3, .. })
        ));
        assert_eq!(dash.table.ready().map(Vec::len), Some(1));
        assert_eq!(dash.trend, Panel::Placeholder(TREND_HINT.to_string()));
    }

    #[test]
    fn test_missing_data_becomes_placeholder() {
        let mut s = session();
        s.set_selection(Selection::entity("Iraq")).unwrap();
        let dash = s.refresh();

        assert_eq!(
            dash.kpis,
            Panel::Placeholder("no data for 'Iraq' in 2007".to_string())
        );
        // Other views are unaffected.
        assert_eq!(dash.geo.ready().map(GeoSeries::len), Some(1));
        assert_eq!(dash.table.ready().map(Vec::len), Some(0));
        assert!(dash.trend.ready().is_some());
    }

    #[test]
    fn test_invalid_selection_keeps_previous() {
        let mut s = session();
        s.set_selection(Selection::entity("Chad")).unwrap();
        let err = s.set_selection(Selection::entity("Xanadu")).unwrap_err();

        assert!(matches!(err, AggregateError::InvalidSelection { .. }));
        assert_eq!(s.selection(), &Selection::entity("Chad"));
        assert!(s.status_message.is_some());

        s.set_selection(Selection::All).unwrap();
        assert!(s.status_message.is_none());
    }

    #[test]
    fn test_replace_dataset_resets_vanished_selection() {
        let mut s = session();
        s.set_selection(Selection::entity("Iraq")).unwrap();

        let reloaded =
            Dataset::from_records(vec![record("Chad", "Africa", 2007, 50.7, 1.0e7)]).unwrap();
        s.replace_dataset(Arc::new(reloaded));

        assert_eq!(s.selection(), &Selection::All);
        assert_eq!(s.dataset().len(), 1);
    }

    #[test]
    fn test_reference_period_drives_point_in_time_views() {
        let mut s = session();
        s.set_selection(Selection::entity("Iraq")).unwrap();
        assert_eq!(s.reference_period(), 2007);

        s.set_reference_period(2002);
        assert_eq!(s.reference_period(), 2002);
        let dash = s.refresh();

        assert_eq!(dash.reference_period, 2002);
        assert!(matches!(
            dash.kpis.ready(),
            Some(KpiSet::Entity { reference_period: 2002, .. })
        ));
        assert_eq!(dash.table.ready().map(Vec::len), Some(1));
    }

    #[test]
    fn test_dashboard_serializes() {
        let mut s = session();
        s.set_selection(Selection::entity("Chad")).unwrap();
        let json = serde_json::to_value(s.refresh()).unwrap();

        assert_eq!(json["selection"], "Chad");
        assert_eq!(json["kpis"]["status"], "ready");
        assert_eq!(json["kpis"]["content"]["kind"], "entity");
        assert_eq!(json["comparison"]["content"]["keyed_by"], "entity");
    }
}
