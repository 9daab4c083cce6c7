//! End-to-end run: feed → window → flatten → counts → chart and table
//!
//! Every stage consumes its whole input before the next one starts, and any
//! error ends the run.

use crate::aggregation::{
    count_attributes_per_event_category_type, count_tag_occurrences, is_tag_in, GroupedCount,
};
use crate::config::ReportConfig;
use crate::core::{load_feed, Event};
use crate::error::Result;
use crate::flatten::{attributes_list_build, tags_list_build, FlatTable};
use crate::report::TreemapChart;
use crate::window::{Clock, DateWindow};
use chrono::NaiveDateTime;
use log::{debug, info};
use std::path::Path;

/// Which events to report on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub begin: Option<String>,
    pub end: Option<String>,
    /// Only keep the last N days (retention floor)
    pub last_days: Option<u32>,
    /// Regular expression on tag names; events without a matching tag are dropped
    pub tag: Option<String>,
}

/// Tables and counts for one window.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub window: DateWindow,
    pub events: Vec<Event>,
    pub attributes: FlatTable,
    /// Tags whose propagated event date falls in the window
    pub tags: FlatTable,
    /// Keyed by `(event, category, type)`
    pub attribute_counts: GroupedCount,
    /// Keyed by `(category, type)`, one contiguous run per category
    pub category_counts: GroupedCount,
    pub tag_counts: GroupedCount,
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct ReportSummary {
    pub window: DateWindow,
    pub events: usize,
    pub attributes: usize,
    pub tags: usize,
    pub categories: usize,
    pub tag_counts: GroupedCount,
}

/// Filters `events` to the requested window and builds every table and count.
pub fn analyze(events: &[Event], request: &AnalysisRequest, now: NaiveDateTime) -> Result<Analysis> {
    let window = DateWindow::resolve(
        request.begin.as_deref(),
        request.end.as_deref(),
        request.last_days,
        now,
    )?;
    debug!("Resolved window [{}, {}]", window.begin, window.end);

    let mut selected = window.select(events)?;
    let tags = window.select_table(&tags_list_build(events)?)?;

    if let Some(pattern) = &request.tag {
        let tagged = is_tag_in(&tags, pattern)?;
        selected.retain(|event| tagged.contains(&event.id));
        debug!("{} events carry a tag matching {}", selected.len(), pattern);
    }

    let attributes = attributes_list_build(&selected);
    let attribute_counts = count_attributes_per_event_category_type(&attributes)?;
    let category_counts =
        attribute_counts.collapse(&["category", "type"])?.cluster_by_first_level();
    let tag_counts = count_tag_occurrences(&tags)?;

    Ok(Analysis {
        window,
        events: selected,
        attributes,
        tags,
        attribute_counts,
        category_counts,
        tag_counts,
    })
}

/// Loads the feed at `feed`, analyses it and writes the chart and table.
pub fn run(
    feed: impl AsRef<Path>,
    request: &AnalysisRequest,
    config: &ReportConfig,
    clock: &dyn Clock,
) -> Result<ReportSummary> {
    let events = load_feed(feed)?;
    let analysis = analyze(&events, request, clock.now())?;

    let chart =
        TreemapChart::from_counts(&config.title, &analysis.category_counts, &config.colours)?;
    chart.write_treemap(&config.treemap_path, config.width, config.height)?;
    chart.write_table(&config.table_path, &config.stylesheet)?;

    let summary = ReportSummary {
        window: analysis.window,
        events: analysis.events.len(),
        attributes: analysis.attributes.len(),
        tags: analysis.tags.len(),
        categories: chart.categories.len(),
        tag_counts: analysis.tag_counts,
    };
    info!(
        "Reported {} events, {} attributes in {} categories, {} tags",
        summary.events, summary.attributes, summary.categories, summary.tags
    );
    Ok(summary)
}
