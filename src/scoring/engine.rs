//! Pure scoring of one fixture's markets into candidate picks.
//!
//! No I/O: callers hand in the stored odds and prediction payloads and get
//! back zero or more [`Candidate`]s. Buckets are evaluated in a fixed order
//! and the first match wins; where the moderate and aggressive odd ranges
//! overlap, moderate takes precedence.

use serde_json::Value;

use crate::types::{Candidate, Fixture, PickMarket, RiskLevel, Selection};

use super::markets::{extract_markets, parse_probabilities, MarketOdds};

/// Weight of the (not yet integrated) data-quality signal. Held at 1.0 until
/// a real source feeds it.
const DATA_CONFIDENCE: f64 = 1.0;

const UNDER_ODD_MIN: f64 = 1.20;
const UNDER_ODD_MAX: f64 = 1.50;
const OVER_LINE: f64 = 2.5;
const OVER_ODD_MIN: f64 = 1.60;
const OVER_ODD_MAX: f64 = 2.00;
const BTTS_ODD_MIN: f64 = 1.50;
const BTTS_ODD_MAX: f64 = 2.50;

pub fn score_fixture(fixture: &Fixture, odds: &Value, predictions: &Value) -> Vec<Candidate> {
    let markets = extract_markets(odds);
    let probs = parse_probabilities(predictions);

    let mut candidates = Vec::new();
    let mut goal_lines = Vec::new();

    for market in &markets {
        match market {
            MarketOdds::MatchWinner { home, away, .. } => {
                if let Some(c) = score_match_winner(fixture, &probs, *home, *away) {
                    candidates.push(c);
                }
            }
            MarketOdds::GoalsOverUnder { line, over, under } => {
                goal_lines.push((*line, *over, *under));
            }
            MarketOdds::BothTeamsScore { yes, .. } => {
                if let Some(c) = score_btts(fixture, *yes) {
                    candidates.push(c);
                }
            }
        }
    }

    candidates.extend(score_over_under(fixture, &goal_lines));
    candidates
}

fn score_match_winner(
    fixture: &Fixture,
    probs: &super::markets::WinProbabilities,
    home_odd: f64,
    away_odd: f64,
) -> Option<Candidate> {
    // The favorite is the more probable winner; draw never is one. Ties go
    // to the away side.
    let (team, win_prob, odd) = if probs.home > probs.away {
        (fixture.home_name.clone(), probs.home, home_odd)
    } else {
        (fixture.away_name.clone(), probs.away, away_odd)
    };

    let risk = bucket_match_winner(win_prob, odd)?;
    let score = 0.5 * win_prob + 0.3 * odds_quality(odd) + 0.2 * DATA_CONFIDENCE;

    Some(Candidate {
        fixture: fixture.clone(),
        risk,
        market: PickMarket::MatchWinner,
        line: None,
        selection: None,
        score,
        odd,
        win_prob: Some(win_prob),
        team: Some(team.clone()),
        title: format!("{team} to win"),
        thesis: format!(
            "The model gives {team} a {:.0}% win probability at an odd of {odd:.2}.",
            win_prob * 100.0
        ),
    })
}

fn bucket_match_winner(win_prob: f64, odd: f64) -> Option<RiskLevel> {
    if win_prob >= 0.72 && (1.40..=1.85).contains(&odd) {
        Some(RiskLevel::Conservative)
    } else if (0.45..0.72).contains(&win_prob) && (1.50..=2.20).contains(&odd) {
        Some(RiskLevel::Moderate)
    } else if win_prob >= 0.45 && (2.00..=3.50).contains(&odd) {
        Some(RiskLevel::Aggressive)
    } else {
        None
    }
}

fn odds_quality(odd: f64) -> f64 {
    if odd > 1.4 && odd < 2.5 {
        1.0
    } else if odd <= 1.4 {
        0.6
    } else {
        0.4
    }
}

/// Goal lines ascending: the first line whose Under odd sits strictly inside
/// (1.20, 1.50) yields a conservative Under and stops the walk. The Over 2.5
/// check is independent and may fire for the same fixture.
fn score_over_under(
    fixture: &Fixture,
    lines: &[(f64, Option<f64>, Option<f64>)],
) -> Vec<Candidate> {
    let mut out = Vec::new();

    for &(line, over, under) in lines {
        let (Some(_over), Some(under)) = (over, under) else {
            continue;
        };
        if under > UNDER_ODD_MIN && under < UNDER_ODD_MAX {
            out.push(Candidate {
                fixture: fixture.clone(),
                risk: RiskLevel::Conservative,
                market: PickMarket::OverUnder,
                line: Some(line),
                selection: Some(Selection::Under),
                score: 1.0 / under,
                odd: under,
                win_prob: None,
                team: None,
                title: format!("Under {line} goals"),
                thesis: format!(
                    "Under {line} priced at {under:.2} — the market leans to a low-scoring game."
                ),
            });
            break;
        }
    }

    if let Some(&(line, Some(over), _)) = lines.iter().find(|(l, ..)| *l == OVER_LINE) {
        if (OVER_ODD_MIN..=OVER_ODD_MAX).contains(&over) {
            out.push(Candidate {
                fixture: fixture.clone(),
                risk: RiskLevel::Moderate,
                market: PickMarket::OverUnder,
                line: Some(line),
                selection: Some(Selection::Over),
                score: 1.0 / over,
                odd: over,
                win_prob: None,
                team: None,
                title: format!("Over {line} goals"),
                thesis: format!("Over {line} at {over:.2} offers value on a game with goals."),
            });
        }
    }

    out
}

fn score_btts(fixture: &Fixture, yes: f64) -> Option<Candidate> {
    if !(BTTS_ODD_MIN..=BTTS_ODD_MAX).contains(&yes) {
        return None;
    }
    Some(Candidate {
        fixture: fixture.clone(),
        risk: RiskLevel::Moderate,
        market: PickMarket::Btts,
        line: None,
        selection: Some(Selection::Yes),
        score: 1.0 / yes,
        odd: yes,
        win_prob: None,
        team: None,
        title: "Both teams to score".to_string(),
        thesis: format!("BTTS priced at {yes:.2} fits the profile for goals at both ends."),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> Fixture {
        Fixture {
            id: 1001,
            league_id: 39,
            home_team_id: 1,
            away_team_id: 2,
            home_name: "Arsenal".into(),
            away_name: "Chelsea".into(),
            league_name: Some("Premier League".into()),
            kickoff_utc: None,
            status: "NS".into(),
        }
    }

    fn mw_odds(home: &str, away: &str) -> Value {
        json!([{"name": "Match Winner", "values": [
            {"value": "Home", "odd": home},
            {"value": "Away", "odd": away}
        ]}])
    }

    fn percents(home: &str, away: &str) -> Value {
        json!({"predictions": {"percent": {"home": home, "draw": "10%", "away": away}}})
    }

    fn ou_odds(values: Value) -> Value {
        json!([{"name": "Goals Over/Under", "values": values}])
    }

    #[test]
    fn strong_favorite_scores_conservative() {
        let got = score_fixture(&fixture(), &mw_odds("1.60", "6.00"), &percents("80%", "8%"));
        assert_eq!(got.len(), 1);
        let c = &got[0];
        assert_eq!(c.risk, RiskLevel::Conservative);
        assert_eq!(c.market, PickMarket::MatchWinner);
        assert!((c.score - 0.90).abs() < 1e-9);
        assert_eq!(c.odd, 1.60);
        assert_eq!(c.win_prob, Some(0.80));
        assert_eq!(c.team.as_deref(), Some("Arsenal"));
    }

    #[test]
    fn coin_flip_at_moderate_odds_is_moderate_only() {
        // 0.50 / 1.90 fails aggressive's 2.00 floor; moderate catches it.
        let got = score_fixture(&fixture(), &mw_odds("1.90", "4.00"), &percents("50%", "30%"));
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].risk, RiskLevel::Moderate);
    }

    #[test]
    fn moderate_wins_the_overlapping_odd_range() {
        // 2.00 sits in both the moderate and aggressive ranges; the bucket
        // order resolves it to moderate.
        let got = score_fixture(&fixture(), &mw_odds("2.00", "4.00"), &percents("50%", "30%"));
        assert_eq!(got[0].risk, RiskLevel::Moderate);
    }

    #[test]
    fn long_shot_favorite_is_aggressive() {
        let got = score_fixture(&fixture(), &mw_odds("2.60", "2.80"), &percents("46%", "30%"));
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].risk, RiskLevel::Aggressive);
    }

    #[test]
    fn favorite_below_every_bucket_yields_nothing() {
        let got = score_fixture(&fixture(), &mw_odds("1.10", "9.00"), &percents("90%", "3%"));
        assert!(got.is_empty());
    }

    #[test]
    fn away_favorite_uses_away_odd() {
        let got = score_fixture(&fixture(), &mw_odds("5.00", "1.70"), &percents("10%", "75%"));
        assert_eq!(got[0].team.as_deref(), Some("Chelsea"));
        assert_eq!(got[0].odd, 1.70);
    }

    #[test]
    fn odds_quality_boundaries() {
        assert_eq!(odds_quality(1.40), 0.6);
        assert_eq!(odds_quality(1.41), 1.0);
        assert_eq!(odds_quality(2.49), 1.0);
        assert_eq!(odds_quality(2.50), 0.4);
    }

    #[test]
    fn first_qualifying_under_line_wins_and_stops() {
        let odds = ou_odds(json!([
            {"value": "Over 1.5", "odd": "2.60"},
            {"value": "Under 1.5", "odd": "1.45"},
            {"value": "Over 2.5", "odd": "1.40"},
            {"value": "Under 2.5", "odd": "1.45"}
        ]));
        let got = score_fixture(&fixture(), &odds, &json!({}));
        let unders: Vec<_> = got
            .iter()
            .filter(|c| c.selection == Some(Selection::Under))
            .collect();
        assert_eq!(unders.len(), 1);
        let u = unders[0];
        assert_eq!(u.risk, RiskLevel::Conservative);
        assert_eq!(u.line, Some(1.5));
        assert!((u.score - 1.0 / 1.45).abs() < 1e-9);
    }

    #[test]
    fn under_range_is_exclusive_at_both_ends() {
        for odd in ["1.20", "1.50"] {
            let odds = ou_odds(json!([
                {"value": "Over 1.5", "odd": "2.60"},
                {"value": "Under 1.5", "odd": odd}
            ]));
            assert!(score_fixture(&fixture(), &odds, &json!({})).is_empty());
        }
    }

    #[test]
    fn lines_missing_a_side_are_skipped() {
        let odds = ou_odds(json!([
            {"value": "Under 0.5", "odd": "1.30"},
            {"value": "Over 1.5", "odd": "1.90"},
            {"value": "Under 1.5", "odd": "1.45"}
        ]));
        let got = score_fixture(&fixture(), &odds, &json!({}));
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].line, Some(1.5));
    }

    #[test]
    fn over_two_and_a_half_fires_independently_of_under() {
        let odds = ou_odds(json!([
            {"value": "Over 1.5", "odd": "2.60"},
            {"value": "Under 1.5", "odd": "1.45"},
            {"value": "Over 2.5", "odd": "1.80"},
            {"value": "Under 2.5", "odd": "1.95"}
        ]));
        let got = score_fixture(&fixture(), &odds, &json!({}));
        assert_eq!(got.len(), 2);
        assert!(got
            .iter()
            .any(|c| c.selection == Some(Selection::Under) && c.line == Some(1.5)));
        let over = got
            .iter()
            .find(|c| c.selection == Some(Selection::Over))
            .unwrap();
        assert_eq!(over.risk, RiskLevel::Moderate);
        assert_eq!(over.line, Some(2.5));
        assert!((over.score - 1.0 / 1.80).abs() < 1e-9);
    }

    #[test]
    fn over_range_is_inclusive() {
        for odd in ["1.60", "2.00"] {
            let odds = ou_odds(json!([
                {"value": "Over 2.5", "odd": odd},
                {"value": "Under 2.5", "odd": "2.20"}
            ]));
            let got = score_fixture(&fixture(), &odds, &json!({}));
            assert_eq!(got.len(), 1);
            assert_eq!(got[0].selection, Some(Selection::Over));
        }
    }

    #[test]
    fn btts_fires_inside_its_inclusive_range() {
        for (odd, expect) in [("1.50", true), ("2.50", true), ("1.49", false), ("2.51", false)] {
            let odds = json!([{"name": "Both Teams Score", "values": [{"value": "Yes", "odd": odd}]}]);
            let got = score_fixture(&fixture(), &odds, &json!({}));
            assert_eq!(!got.is_empty(), expect, "odd {odd}");
            if expect {
                assert_eq!(got[0].risk, RiskLevel::Moderate);
                assert_eq!(got[0].market, PickMarket::Btts);
            }
        }
    }

    #[test]
    fn empty_payloads_yield_no_candidates() {
        assert!(score_fixture(&fixture(), &json!([]), &json!({})).is_empty());
    }
}
