//! Rating widgets: per-category scoring and score presentation.

use crate::error::{Error, Result};
use crate::models::Score;
use std::fmt;

/// Starting value of every category slider.
pub const DEFAULT_CATEGORY_SCORE: f64 = 5.0;

/// Axes of the detailed rating form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Narrative,
    Technical,
    Performance,
    Emotional,
    Cultural,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Narrative,
        Category::Technical,
        Category::Performance,
        Category::Emotional,
        Category::Cultural,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Category::Narrative => "narrative",
            Category::Technical => "technical",
            Category::Performance => "performance",
            Category::Emotional => "emotional",
            Category::Cultural => "cultural",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Category::Narrative => "Narrative Execution",
            Category::Technical => "Technical Craftsmanship",
            Category::Performance => "Performance Quality",
            Category::Emotional => "Emotional Resonance",
            Category::Cultural => "Cultural Impact & Originality",
        }
    }

    fn index(self) -> usize {
        match self {
            Category::Narrative => 0,
            Category::Technical => 1,
            Category::Performance => 2,
            Category::Emotional => 3,
            Category::Cultural => 4,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Scores for the five categories. The overall score is their mean.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CategoryRatings {
    scores: [f64; 5],
}

impl Default for CategoryRatings {
    fn default() -> Self {
        CategoryRatings {
            scores: [DEFAULT_CATEGORY_SCORE; 5],
        }
    }
}

impl CategoryRatings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from scores in [`Category::ALL`] order.
    pub fn from_scores(scores: [f64; 5]) -> Result<Self> {
        let mut ratings = Self::new();
        for (category, score) in Category::ALL.into_iter().zip(scores) {
            ratings.set(category, score)?;
        }
        Ok(ratings)
    }

    pub fn get(&self, category: Category) -> f64 {
        self.scores[category.index()]
    }

    /// Move one slider. Values are rounded to one decimal.
    ///
    /// # Errors
    ///
    /// `Error::ValidationError` if `score` is outside `[1, 10]`.
    pub fn set(&mut self, category: Category, score: f64) -> Result<()> {
        let score = Score::new(score).map_err(|_| {
            Error::ValidationError(format!("{} must be between 1 and 10, got {}", category.id(), score))
        })?;
        self.scores[category.index()] = score.value();
        Ok(())
    }

    /// Arithmetic mean of the five categories.
    pub fn overall(&self) -> f64 {
        self.scores.iter().sum::<f64>() / self.scores.len() as f64
    }

    /// Overall score with one decimal, as shown next to the form.
    pub fn overall_display(&self) -> String {
        format_score(self.overall())
    }

    /// Overall score as submitted to the backend.
    pub fn overall_score(&self) -> Result<Score> {
        Score::new(self.overall())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

/// One decimal, e.g. `7.0`.
pub fn format_score(value: f64) -> String {
    format!("{:.1}", value)
}

/// Colour bucket of a score badge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum RatingBand {
    /// Not a number, or outside `[1, 10]`.
    Invalid,
    /// Below 6.
    Low,
    /// 6 up to 7.5.
    Medium,
    /// 7.5 and up, split into half-point steps from 7.5 to 9.5.
    High(u8),
}

impl RatingBand {
    pub fn of(value: f64) -> Self {
        if !value.is_finite() || !(1.0..=10.0).contains(&value) {
            return RatingBand::Invalid;
        }
        if value < 6.0 {
            RatingBand::Low
        } else if value < 7.5 {
            RatingBand::Medium
        } else if value < 8.0 {
            RatingBand::High(1)
        } else if value < 8.5 {
            RatingBand::High(2)
        } else if value < 9.0 {
            RatingBand::High(3)
        } else if value < 9.5 {
            RatingBand::High(4)
        } else {
            RatingBand::High(5)
        }
    }

    /// Parse a score as the API returns it (`"8.8"`); junk is `Invalid`.
    pub fn of_str(raw: &str) -> Self {
        raw.trim()
            .parse::<f64>()
            .map(Self::of)
            .unwrap_or(RatingBand::Invalid)
    }
}

/// Verbal label shown under the quick-rating slider.
pub fn rating_label(value: f64) -> &'static str {
    if value < 3.0 {
        "Poor"
    } else if value < 5.0 {
        "Below Average"
    } else if value < 6.0 {
        "Average"
    } else if value < 7.5 {
        "Good"
    } else if value < 9.0 {
        "Great"
    } else if value == 10.0 {
        "Cap"
    } else {
        "Excellent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_average_to_five() {
        let ratings = CategoryRatings::new();
        assert_eq!(ratings.overall(), 5.0);
        assert_eq!(ratings.overall_display(), "5.0");
    }

    #[test]
    fn test_five_to_nine_average_to_seven() {
        let ratings =
            CategoryRatings::from_scores([5.0, 6.0, 7.0, 8.0, 9.0]).expect("Failed to build");
        assert_eq!(ratings.overall(), 7.0);
        assert_eq!(ratings.overall_display(), "7.0");
        assert_eq!(ratings.overall_score().expect("valid").value(), 7.0);
    }

    #[test]
    fn test_set_rounds_and_rejects() {
        let mut ratings = CategoryRatings::new();
        ratings
            .set(Category::Technical, 8.26)
            .expect("Failed to set");
        assert_eq!(ratings.get(Category::Technical), 8.3);

        let err = ratings
            .set(Category::Cultural, 0.0)
            .expect_err("Should reject");
        assert!(err.to_string().contains("cultural"));
        assert_eq!(ratings.get(Category::Cultural), DEFAULT_CATEGORY_SCORE);
    }

    #[test]
    fn test_bands() {
        assert_eq!(RatingBand::of(5.9), RatingBand::Low);
        assert_eq!(RatingBand::of(6.0), RatingBand::Medium);
        assert_eq!(RatingBand::of(7.4), RatingBand::Medium);
        assert_eq!(RatingBand::of(7.5), RatingBand::High(1));
        assert_eq!(RatingBand::of(9.7), RatingBand::High(5));
        assert_eq!(RatingBand::of(0.5), RatingBand::Invalid);
        assert_eq!(RatingBand::of_str("N/A"), RatingBand::Invalid);
        assert_eq!(RatingBand::of_str("8.8"), RatingBand::High(3));
    }

    #[test]
    fn test_labels() {
        assert_eq!(rating_label(2.0), "Poor");
        assert_eq!(rating_label(7.0), "Good");
        assert_eq!(rating_label(9.5), "Excellent");
        assert_eq!(rating_label(10.0), "Cap");
    }
}
