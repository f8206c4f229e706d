use std::collections::HashMap;
use vqa_common::Prediction;

/// 解答ごとの件数（件数の多い順、同数は解答の辞書順）
pub fn answer_distribution(predictions: &[Prediction]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for p in predictions {
        *counts.entry(p.answer.as_str()).or_default() += 1;
    }

    let mut distribution: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(answer, count)| (answer.to_string(), count))
        .collect();
    distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    distribution
}

pub fn print_summary(predictions: &[Prediction]) {
    println!("予測件数: {}", predictions.len());

    println!("\n予測結果サンプル:");
    for p in predictions.iter().take(10) {
        println!("  {:>6}  {}", p.id, p.answer);
    }

    println!("\n解答分布:");
    for (answer, count) in answer_distribution(predictions) {
        let label = if answer.is_empty() { "(空)" } else { answer.as_str() };
        println!("  {:<8} {}", label, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_distribution_order() {
        let predictions = vec![
            Prediction::new("1", "B"),
            Prediction::new("2", "A"),
            Prediction::new("3", "B"),
            Prediction::new("4", ""),
            Prediction::new("5", "A"),
            Prediction::new("6", "B"),
        ];

        let distribution = answer_distribution(&predictions);
        assert_eq!(
            distribution,
            vec![("B".to_string(), 3), ("A".to_string(), 2), ("".to_string(), 1)]
        );
    }

    #[test]
    fn test_answer_distribution_empty() {
        assert!(answer_distribution(&[]).is_empty());
    }
}
