use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::pagination::PageRequest;
use crate::models::domain::{Post, User};

/// One ordered page of records; carries no total count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage<T> {
    pub items: Vec<T>,
    /// `None` for unpaginated lists
    pub page: Option<PageRequest>,
}

impl<T> ResultPage<T> {
    pub fn new(items: Vec<T>, page: Option<PageRequest>) -> Self {
        Self { items, page }
    }

    pub fn empty(page: Option<PageRequest>) -> Self {
        Self::new(Vec::new(), page)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Uniformly permute the records of this page only.
    ///
    /// Records never move across page boundaries: page N shuffled still holds
    /// exactly the records of deterministic page N.
    pub fn shuffled<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        self.items.shuffle(rng);
        self
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> ResultPage<U> {
        ResultPage {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
        }
    }
}

impl<T> IntoIterator for ResultPage<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// A visitor of the requester's profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visitor {
    pub user: User,
    pub visit_times: i32,
    pub visited_at: DateTime<Utc>,
}

/// User in a nearby list with distance from the requester, when known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyUser {
    pub user: User,
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyPost {
    pub post: Post,
    pub distance_km: Option<f64>,
}
