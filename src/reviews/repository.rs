use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::ids::generate_id;
use crate::kv::{decode_list, KvStore};
use crate::reviews::{
    clamp_rating, Review, ReviewStatus, DEFAULT_RATING, MAX_NAME_CHARS, MAX_TEXT_CHARS,
};
use crate::validation::truncate_chars;

/// Storage key holding the serialized list of reviews
pub const REVIEWS_STORAGE_KEY: &str = "ohana_reviews";

/// Cleaned fields of a review about to be stored
#[derive(Debug, Clone)]
pub struct NewReview {
    pub name: String,
    pub text: String,
    pub rating: Option<f64>,
}

/// Store of guest reviews
///
/// One serialized list under one key, rewritten on every change. An
/// in-process mirror of the last list read or written serves reads when the
/// backend fails. Changes made while the backend is unreadable stay in the
/// mirror and are not written back, so a stale mirror never replaces the
/// stored list.
#[derive(Clone)]
pub struct ReviewRepository {
    kv: Arc<dyn KvStore>,
    mirror: Arc<RwLock<Vec<Review>>>,
}

/// A list read for modification, and where it came from
struct Snapshot {
    reviews: Vec<Review>,
    from_backend: bool,
}

impl ReviewRepository {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            mirror: Arc::new(RwLock::new(Vec::new())),
        }
    }

    async fn load(&self) -> Snapshot {
        match self.kv.get(REVIEWS_STORAGE_KEY).await {
            Ok(raw) => {
                let reviews: Vec<Review> = decode_list(REVIEWS_STORAGE_KEY, raw);
                *self.mirror.write().await = reviews.clone();
                Snapshot {
                    reviews,
                    from_backend: true,
                }
            }
            Err(e) => {
                warn!("Reviews backend unavailable, serving in-memory copy: {}", e);
                Snapshot {
                    reviews: self.mirror.read().await.clone(),
                    from_backend: false,
                }
            }
        }
    }

    async fn save(&self, reviews: Vec<Review>, from_backend: bool) {
        if from_backend {
            match serde_json::to_string(&reviews) {
                Ok(encoded) => {
                    if let Err(e) = self.kv.set(REVIEWS_STORAGE_KEY, &encoded).await {
                        warn!("Failed to persist reviews to {}, keeping them in memory: {}", self.kv.backend(), e);
                    }
                }
                Err(e) => warn!("Failed to encode reviews: {}", e),
            }
        } else {
            warn!("Reviews backend unreadable, change kept in memory only");
        }
        *self.mirror.write().await = reviews;
    }

    /// Every review in storage order (admin view)
    pub async fn list_all(&self) -> Vec<Review> {
        self.load().await.reviews
    }

    /// Approved reviews, newest first
    pub async fn list_approved(&self) -> Vec<Review> {
        let mut approved: Vec<Review> = self
            .load()
            .await
            .reviews
            .into_iter()
            .filter(|r| r.status == ReviewStatus::Approved)
            .collect();
        approved.sort_by(|a, b| b.date.cmp(&a.date));
        approved
    }

    /// Reviews with the given status, storage order
    pub async fn list_by_status(&self, status: ReviewStatus) -> Vec<Review> {
        self.load()
            .await
            .reviews
            .into_iter()
            .filter(|r| r.status == status)
            .collect()
    }

    /// Store a new review as pending
    ///
    /// Name and text are trimmed and truncated, the rating is rounded and
    /// clamped to 1..=5 (5 when absent).
    pub async fn submit(&self, new: NewReview) -> Review {
        let Snapshot {
            mut reviews,
            from_backend,
        } = self.load().await;
        let review = Review {
            id: generate_id("rev"),
            name: truncate_chars(new.name.trim(), MAX_NAME_CHARS),
            text: truncate_chars(new.text.trim(), MAX_TEXT_CHARS),
            rating: clamp_rating(new.rating.unwrap_or(DEFAULT_RATING)),
            date: Utc::now(),
            status: ReviewStatus::Pending,
        };
        reviews.push(review.clone());
        self.save(reviews, from_backend).await;

        info!("Review {} submitted ({} stars)", review.id, review.rating);
        review
    }

    /// Set the moderation status; `None` when the id is unknown
    ///
    /// Setting the current status again is accepted and changes nothing.
    pub async fn set_status(&self, id: &str, status: ReviewStatus) -> Option<Review> {
        let Snapshot {
            mut reviews,
            from_backend,
        } = self.load().await;
        let review = reviews.iter_mut().find(|r| r.id == id)?;
        let previous = review.status;
        review.status = status;
        let updated = review.clone();
        self.save(reviews, from_backend).await;

        info!("Review {} moved from {} to {}", id, previous, status);
        Some(updated)
    }

    /// Delete a review; false when the id is unknown
    pub async fn delete(&self, id: &str) -> bool {
        let Snapshot {
            reviews,
            from_backend,
        } = self.load().await;
        let before = reviews.len();
        let remaining: Vec<Review> = reviews.into_iter().filter(|r| r.id != id).collect();
        if remaining.len() == before {
            return false;
        }
        self.save(remaining, from_backend).await;
        info!("Review {} deleted", id);
        true
    }
}
