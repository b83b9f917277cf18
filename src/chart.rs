//! Score-over-level series for the results chart.

use serde::Serialize;

use crate::domain::HistoryEntry;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundResult {
  Correct,
  Incorrect,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
  pub level: u32,
  pub score: u32,
  /// Absent on the origin point.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub result: Option<RoundResult>,
}

/// Origin point `(0, 0)` followed by one point per completed round, in play order.
pub fn score_series(history: &[HistoryEntry]) -> Vec<ChartPoint> {
  let origin = ChartPoint { level: 0, score: 0, result: None };
  std::iter::once(origin)
    .chain(history.iter().map(|h| ChartPoint {
      level: h.level,
      score: h.score_after,
      result: Some(if h.is_correct { RoundResult::Correct } else { RoundResult::Incorrect }),
    }))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry(level: u32, score_after: u32, is_correct: bool) -> HistoryEntry {
    HistoryEntry {
      level,
      score_after,
      subject_a: "Arsenal".into(),
      subject_b: "Borussia Dortmund".into(),
      player_answer: "Aubameyang".into(),
      is_correct,
    }
  }

  #[test]
  fn empty_history_is_just_the_origin() {
    assert_eq!(score_series(&[]), vec![ChartPoint { level: 0, score: 0, result: None }]);
  }

  #[test]
  fn points_follow_history_order() {
    let series = score_series(&[entry(1, 10, true), entry(2, 20, true), entry(3, 20, false)]);
    assert_eq!(series.len(), 4);
    assert_eq!(series[2], ChartPoint { level: 2, score: 20, result: Some(RoundResult::Correct) });
    assert_eq!(series[3].result, Some(RoundResult::Incorrect));
    assert_eq!(series[3].score, 20);

    let json = serde_json::to_value(&series).unwrap();
    assert!(json[0].get("result").is_none());
    assert_eq!(json[3]["result"], "incorrect");
  }
}
