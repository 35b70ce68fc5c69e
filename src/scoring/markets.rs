//! Typed extraction from the stored odds/prediction payloads.
//!
//! The odds payload is the normalized `[{name, values: [{value, odd}]}]`
//! shape written by enrichment. Everything here is tolerant: a missing
//! market, a malformed odd, or an absent percent string yields an absent
//! value, never an error.

use serde_json::Value;

/// Goal lines the Over/Under market is evaluated at, ascending.
pub const GOAL_LINES: [f64; 4] = [0.5, 1.5, 2.5, 3.5];

/// One bettable market with its decimal odds, as found for a fixture.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketOdds {
    MatchWinner {
        home: f64,
        draw: Option<f64>,
        away: f64,
    },
    GoalsOverUnder {
        line: f64,
        over: Option<f64>,
        under: Option<f64>,
    },
    BothTeamsScore {
        yes: f64,
        no: Option<f64>,
    },
}

/// Predicted outcome probabilities as fractions in [0,1]. Percent strings the
/// provider sends (`"45%"`) that fail to parse degrade to 0.0, which keeps
/// the fixture below every scoring threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WinProbabilities {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

pub fn parse_probabilities(predictions: &Value) -> WinProbabilities {
    let percent = predictions
        .get("predictions")
        .and_then(|p| p.get("percent"));
    let side = |key: &str| -> f64 {
        percent
            .and_then(|p| p.get(key))
            .and_then(Value::as_str)
            .and_then(|s| s.trim_end_matches('%').trim().parse::<f64>().ok())
            .map(|pct| pct / 100.0)
            .unwrap_or(0.0)
    };
    WinProbabilities {
        home: side("home"),
        draw: side("draw"),
        away: side("away"),
    }
}

/// Pull the markets the scoring engine understands out of a normalized odds
/// payload. Goal lines come out one variant per line, ascending.
pub fn extract_markets(odds: &Value) -> Vec<MarketOdds> {
    let Some(entries) = odds.as_array() else {
        return Vec::new();
    };

    let mut out = Vec::new();

    if let Some(values) = market_values(entries, "Match Winner") {
        let home = odd_for(values, "Home");
        let away = odd_for(values, "Away");
        if let (Some(home), Some(away)) = (home, away) {
            out.push(MarketOdds::MatchWinner {
                home,
                draw: odd_for(values, "Draw"),
                away,
            });
        }
    }

    if let Some(values) = market_values(entries, "Goals Over/Under") {
        for line in GOAL_LINES {
            let over = odd_for(values, &format!("Over {line}"));
            let under = odd_for(values, &format!("Under {line}"));
            if over.is_some() || under.is_some() {
                out.push(MarketOdds::GoalsOverUnder { line, over, under });
            }
        }
    }

    if let Some(values) = market_values(entries, "Both Teams Score") {
        if let Some(yes) = odd_for(values, "Yes") {
            out.push(MarketOdds::BothTeamsScore {
                yes,
                no: odd_for(values, "No"),
            });
        }
    }

    out
}

fn market_values<'a>(entries: &'a [Value], name: &str) -> Option<&'a Vec<Value>> {
    entries
        .iter()
        .find(|m| m.get("name").and_then(Value::as_str) == Some(name))?
        .get("values")?
        .as_array()
}

fn odd_for(values: &[Value], selection: &str) -> Option<f64> {
    values
        .iter()
        .find(|v| v.get("value").and_then(Value::as_str) == Some(selection))
        .and_then(|v| v.get("odd"))
        .and_then(parse_odd)
}

/// Odds arrive as strings (`"1.85"`); occasionally as numbers. Anything that
/// is not a finite positive number is treated as missing.
fn parse_odd(v: &Value) -> Option<f64> {
    let odd = match v {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    (odd.is_finite() && odd > 0.0).then_some(odd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn odds_payload() -> Value {
        json!([
            {"name": "Match Winner", "values": [
                {"value": "Home", "odd": "1.60"},
                {"value": "Draw", "odd": "3.90"},
                {"value": "Away", "odd": "5.25"}
            ]},
            {"name": "Goals Over/Under", "values": [
                {"value": "Over 2.5", "odd": "1.80"},
                {"value": "Under 2.5", "odd": "1.95"},
                {"value": "Over 1.5", "odd": "1.25"},
                {"value": "Under 1.5", "odd": "3.60"}
            ]},
            {"name": "Both Teams Score", "values": [
                {"value": "Yes", "odd": "1.72"},
                {"value": "No", "odd": "2.05"}
            ]}
        ])
    }

    #[test]
    fn extracts_all_known_markets() {
        let markets = extract_markets(&odds_payload());
        assert_eq!(
            markets[0],
            MarketOdds::MatchWinner {
                home: 1.60,
                draw: Some(3.90),
                away: 5.25
            }
        );
        // Goal lines come out ascending, only lines with at least one side.
        assert_eq!(
            markets[1],
            MarketOdds::GoalsOverUnder {
                line: 1.5,
                over: Some(1.25),
                under: Some(3.60)
            }
        );
        assert_eq!(
            markets[2],
            MarketOdds::GoalsOverUnder {
                line: 2.5,
                over: Some(1.80),
                under: Some(1.95)
            }
        );
        assert_eq!(
            markets[3],
            MarketOdds::BothTeamsScore {
                yes: 1.72,
                no: Some(2.05)
            }
        );
    }

    #[test]
    fn match_winner_needs_both_side_odds() {
        let odds = json!([
            {"name": "Match Winner", "values": [{"value": "Home", "odd": "1.60"}]}
        ]);
        assert!(extract_markets(&odds).is_empty());
    }

    #[test]
    fn malformed_odds_are_dropped() {
        let odds = json!([
            {"name": "Both Teams Score", "values": [
                {"value": "Yes", "odd": "n/a"},
                {"value": "No", "odd": "-1.5"}
            ]}
        ]);
        assert!(extract_markets(&odds).is_empty());
    }

    #[test]
    fn probabilities_parse_percent_strings() {
        let pred = json!({"predictions": {"percent": {"home": "80%", "draw": "12%", "away": "8%"}}});
        let p = parse_probabilities(&pred);
        assert!((p.home - 0.80).abs() < 1e-9);
        assert!((p.draw - 0.12).abs() < 1e-9);
        assert!((p.away - 0.08).abs() < 1e-9);
    }

    #[test]
    fn malformed_percentages_default_to_zero() {
        let pred = json!({"predictions": {"percent": {"home": "??", "away": "8%"}}});
        let p = parse_probabilities(&pred);
        assert_eq!(p.home, 0.0);
        assert_eq!(p.draw, 0.0);
        assert!((p.away - 0.08).abs() < 1e-9);
    }
}
