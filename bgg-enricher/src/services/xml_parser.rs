//! Thing-endpoint XML payload parser
//!
//! Converts one `/thing?stats=1` response into detailed records, one per
//! `<item>` with a non-empty `id`. A malformed item is reported through the
//! caller's callback and dropped; its siblings are still returned. Only a
//! document that is not well-formed XML fails the whole call, which is the
//! signal the batch enricher uses to bisect a batch.

use crate::error::{DocumentParseError, ItemExtractionError};
use bgg_common::{DetailedRecord, PlayerCountRecommendation};
use roxmltree::{Document, Node};
use std::str::FromStr;

const PLAYER_COUNT_POLL: &str = "suggested_numplayers";
const OVERALL_RANK_NAME: &str = "boardgame";
const NOT_RANKED: &str = "Not Ranked";

const LINK_CATEGORY: &str = "boardgamecategory";
const LINK_MECHANIC: &str = "boardgamemechanic";
const LINK_DESIGNER: &str = "boardgamedesigner";
const LINK_ARTIST: &str = "boardgameartist";
const LINK_PUBLISHER: &str = "boardgamepublisher";

/// Payload parser seam used by the batch enricher
pub trait PayloadParser: Send + Sync {
    /// Parse one response body.
    ///
    /// Per-item failures go to `on_item_error`; `Err` means the document
    /// itself is unusable.
    fn parse(
        &self,
        xml: &str,
        on_item_error: &mut dyn FnMut(ItemExtractionError),
    ) -> Result<Vec<DetailedRecord>, DocumentParseError>;
}

/// roxmltree-backed parser for the XML API v2 thing payload
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlPayloadParser;

impl XmlPayloadParser {
    pub fn new() -> Self {
        Self
    }
}

impl PayloadParser for XmlPayloadParser {
    fn parse(
        &self,
        xml: &str,
        on_item_error: &mut dyn FnMut(ItemExtractionError),
    ) -> Result<Vec<DetailedRecord>, DocumentParseError> {
        parse_items(xml, on_item_error)
    }
}

/// Parse every `<item>` under the document root.
pub fn parse_items(
    xml: &str,
    on_item_error: &mut dyn FnMut(ItemExtractionError),
) -> Result<Vec<DetailedRecord>, DocumentParseError> {
    let doc = Document::parse(xml).map_err(|e| DocumentParseError(e.to_string()))?;

    let mut records = Vec::new();

    for item in children_named(doc.root_element(), "item") {
        let id = match item.attribute("id").map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => continue,
        };

        match extract_item(id, item) {
            Ok(record) => records.push(record),
            Err(reason) => {
                tracing::debug!(item_id = %id, reason = %reason, "Item extraction failed");
                on_item_error(ItemExtractionError {
                    item_id: id.to_string(),
                    reason,
                });
            }
        }
    }

    Ok(records)
}

/// Build a detailed record from one `<item>` element.
///
/// Absent fields are fine. Plain numeric attributes that are present but not
/// numeric fail the item; statistics are parsed leniently, field by field.
fn extract_item(id: &str, item: Node) -> Result<DetailedRecord, String> {
    let mut record = DetailedRecord::new(id);

    if let Some(name) = children_named(item, "name")
        .find(|n| n.attribute("type") == Some("primary"))
        .and_then(|n| n.attribute("value"))
        .filter(|v| !v.is_empty())
    {
        record.name = name.to_string();
    }

    record.year_published = strict_value(item, "yearpublished")?;
    record.description = child(item, "description")
        .and_then(|d| d.text())
        .map(|t| t.trim().to_string());

    record.min_players = strict_value(item, "minplayers")?;
    record.max_players = strict_value(item, "maxplayers")?;
    record.min_play_time = strict_value(item, "minplaytime")?;
    record.max_play_time = strict_value(item, "maxplaytime")?;
    record.playing_time = strict_value(item, "playingtime")?;
    record.min_age = strict_value(item, "minage")?;

    record.categories = link_values(item, LINK_CATEGORY);
    record.mechanics = link_values(item, LINK_MECHANIC);
    record.designers = link_values(item, LINK_DESIGNER);
    record.artists = link_values(item, LINK_ARTIST);
    record.publishers = link_values(item, LINK_PUBLISHER);

    extract_player_counts(&mut record, item)?;
    extract_statistics(&mut record, item);

    Ok(record)
}

fn extract_player_counts(record: &mut DetailedRecord, item: Node) -> Result<(), String> {
    let Some(poll) =
        children_named(item, "poll").find(|p| p.attribute("name") == Some(PLAYER_COUNT_POLL))
    else {
        return Ok(());
    };

    let mut recommendations = Vec::new();

    for results in children_named(poll, "results") {
        let Some(label) = results.attribute("numplayers").filter(|l| !l.is_empty()) else {
            continue;
        };
        let Some(num_players) = parse_player_count(label) else {
            continue;
        };

        let mut recommendation = PlayerCountRecommendation::new(num_players);

        for vote in children_named(results, "result") {
            let votes = match vote.attribute("numvotes") {
                Some(raw) => parse_strict::<u32>(raw)
                    .map_err(|_| format!("invalid numvotes '{}' for {} players", raw, label))?,
                None => 0,
            };

            let tally = match vote.attribute("value") {
                Some("Best") => &mut recommendation.best,
                Some("Recommended") => &mut recommendation.recommended,
                Some("Not Recommended") => &mut recommendation.not_recommended,
                _ => continue,
            };
            *tally = tally.saturating_add(votes);
        }

        recommendations.push(recommendation);
    }

    record.best_player_count = best_player_count(&recommendations);
    record.recommended_player_count = recommended_player_count(&recommendations);
    record.player_count_recommendations = recommendations;
    Ok(())
}

/// `"4+"` → 4; labels that are not numeric after stripping `+` are skipped
fn parse_player_count(label: &str) -> Option<u32> {
    label.trim().trim_end_matches('+').parse().ok()
}

/// Player count with the most "Best" votes; the first one listed wins a tie.
pub fn best_player_count(recommendations: &[PlayerCountRecommendation]) -> Option<u32> {
    first_max_by(recommendations, |r| u64::from(r.best))
}

/// Player count with the most "Best" + "Recommended" votes; the first one listed wins a tie.
pub fn recommended_player_count(recommendations: &[PlayerCountRecommendation]) -> Option<u32> {
    first_max_by(recommendations, PlayerCountRecommendation::positive_votes)
}

fn first_max_by(
    recommendations: &[PlayerCountRecommendation],
    score: impl Fn(&PlayerCountRecommendation) -> u64,
) -> Option<u32> {
    let mut best: Option<(&PlayerCountRecommendation, u64)> = None;
    for rec in recommendations {
        let s = score(rec);
        if best.map_or(true, |(_, top)| s > top) {
            best = Some((rec, s));
        }
    }
    best.filter(|(_, s)| *s > 0).map(|(rec, _)| rec.num_players)
}

fn extract_statistics(record: &mut DetailedRecord, item: Node) {
    let Some(ratings) = child(item, "statistics").and_then(|s| child(s, "ratings")) else {
        return;
    };

    record.users_rated = lenient_value(ratings, "usersrated");
    record.average = lenient_f64(ratings, "average");
    record.bayes_average = lenient_f64(ratings, "bayesaverage");
    record.standard_deviation = lenient_f64(ratings, "stddev");

    if let Some(rank) = child(ratings, "ranks")
        .and_then(|ranks| {
            children_named(ranks, "rank").find(|r| r.attribute("name") == Some(OVERALL_RANK_NAME))
        })
        .and_then(|r| r.attribute("value"))
        .filter(|v| *v != NOT_RANKED)
        .and_then(|v| v.trim().parse().ok())
    {
        record.rank = Some(rank);
    }

    record.owned = lenient_value(ratings, "owned");
    record.trading = lenient_value(ratings, "trading");
    record.wanting = lenient_value(ratings, "wanting");
    record.wishing = lenient_value(ratings, "wishing");
    record.num_comments = lenient_value(ratings, "numcomments");
    record.num_weights = lenient_value(ratings, "numweights");
    record.average_weight = lenient_f64(ratings, "averageweight");
}

fn children_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn value_attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name).and_then(|c| c.attribute("value"))
}

/// Absent → `None`; present but unparseable → item error
fn strict_value<T: FromStr>(item: Node, name: &str) -> Result<Option<T>, String> {
    match value_attr(item, name) {
        Some(raw) => parse_strict(raw)
            .map(Some)
            .map_err(|_| format!("invalid {} value '{}'", name, raw)),
        None => Ok(None),
    }
}

fn parse_strict<T: FromStr>(raw: &str) -> Result<T, T::Err> {
    raw.trim().parse()
}

/// Absent or unparseable → `None`
fn lenient_value<T: FromStr>(node: Node, name: &str) -> Option<T> {
    value_attr(node, name).and_then(|raw| raw.trim().parse().ok())
}

/// As [`lenient_value`], but `NaN` and infinities are treated as unparseable.
/// JSON has no representation for them.
fn lenient_f64(node: Node, name: &str) -> Option<f64> {
    lenient_value::<f64>(node, name).filter(|v| v.is_finite())
}

fn link_values(item: Node, link_type: &str) -> Vec<String> {
    children_named(item, "link")
        .filter(|l| l.attribute("type") == Some(link_type))
        .filter_map(|l| l.attribute("value"))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}
