//! TheCocktailDB API client
//!
//! Implements [`RecipeProvider`] against thecocktaildb.com. The filter
//! endpoints (`filter.php`) return id-only stubs, so tag and ingredient
//! queries resolve full records through concurrent `lookup.php` calls,
//! capped by the caller's limit before the fan-out.
//!
//! Multi-ingredient queries intersect the per-ingredient id lists: a drink
//! must match every requested ingredient, not any of them.

use crate::services::provider::{ExternalRecord, RecipeProvider};
use async_trait::async_trait;
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const PROVIDER_ID: &str = "thecocktaildb";
const USER_AGENT: &str = concat!("barkeep/", env!("CARGO_PKG_VERSION"));

/// Number of ingredient/measure slots in a drink payload
const MAX_INGREDIENT_SLOTS: usize = 15;

/// Alcohol-content filters get their own endpoint; everything else is a
/// category. Matched case-insensitively.
const ALCOHOL_FILTER_TAGS: [&str; 3] = ["alcoholic", "non_alcoholic", "optional_alcohol"];

/// TheCocktailDB API client
pub struct CocktailDbClient {
    http_client: reqwest::Client,
    /// Base URL including the API key segment
    base_url: String,
}

impl CocktailDbClient {
    /// Create a client against the given base URL and API key
    /// ("1" is the public test key)
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> crate::Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| crate::Error::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: format!("{}/{}", base_url.trim_end_matches('/'), api_key),
        })
    }

    /// GET a JSON payload; any failure (transport, status, payload,
    /// cancellation) degrades to `None` with a log line.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        cancel: &CancellationToken,
    ) -> Option<T> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(url = %url, "provider request cancelled");
                return None;
            }
            resp = self.http_client.get(&url).query(params).send() => resp,
        };

        let response = match response {
            Ok(resp) => resp,
            Err(e) => {
                warn!(url = %url, error = %e, "provider request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "provider returned error status");
            return None;
        }

        let payload = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(url = %url, "provider request cancelled mid-body");
                return None;
            }
            body = response.json::<T>() => body,
        };

        match payload {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(url = %url, error = %e, "provider payload failed to parse");
                None
            }
        }
    }

    /// Resolve id stubs to full records via concurrent detail lookups.
    /// Output order matches the id order; failed lookups drop out.
    async fn lookup_details(&self, ids: &[String], cancel: &CancellationToken) -> Vec<ExternalRecord> {
        let lookups = ids.iter().map(|id| async move {
            self.get_json::<DrinkList>("lookup.php", &[("i", id.as_str())], cancel)
                .await
        });

        join_all(lookups)
            .await
            .into_iter()
            .flatten()
            .flat_map(|list| list.drinks.unwrap_or_default())
            .map(|drink| drink.into_record())
            .collect()
    }

    /// Run a `filter.php` query and resolve the stub list
    async fn from_filter(
        &self,
        params: &[(&str, &str)],
        limit: usize,
        cancel: &CancellationToken,
    ) -> Vec<ExternalRecord> {
        let stubs = match self.get_json::<StubList>("filter.php", params, cancel).await {
            Some(list) => list.drinks.unwrap_or_default(),
            None => return Vec::new(),
        };

        let ids: Vec<String> = stubs.into_iter().take(limit).map(|s| s.id).collect();
        if ids.is_empty() {
            return Vec::new();
        }

        self.lookup_details(&ids, cancel).await
    }

    /// Id set of drinks matching a single ingredient
    async fn ids_for_ingredient(
        &self,
        ingredient: &str,
        cancel: &CancellationToken,
    ) -> Vec<String> {
        self.get_json::<StubList>("filter.php", &[("i", ingredient)], cancel)
            .await
            .and_then(|list| list.drinks)
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.id)
            .collect()
    }
}

#[async_trait]
impl RecipeProvider for CocktailDbClient {
    fn provider_id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn random_one(&self, cancel: &CancellationToken) -> Option<ExternalRecord> {
        self.get_json::<DrinkList>("random.php", &[], cancel)
            .await
            .and_then(|list| list.drinks)
            .and_then(|drinks| drinks.into_iter().next())
            .map(|drink| drink.into_record())
    }

    async fn search_by_text(
        &self,
        query: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Vec<ExternalRecord> {
        self.get_json::<DrinkList>("search.php", &[("s", query)], cancel)
            .await
            .and_then(|list| list.drinks)
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .map(|drink| drink.into_record())
            .collect()
    }

    async fn filter_by_tag(
        &self,
        tag: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Vec<ExternalRecord> {
        let tag = tag.trim();
        let param = if is_alcohol_filter(tag) { "a" } else { "c" };
        self.from_filter(&[(param, tag)], limit, cancel).await
    }

    async fn filter_by_ingredients(
        &self,
        ingredients: &[String],
        limit: usize,
        cancel: &CancellationToken,
    ) -> Vec<ExternalRecord> {
        let wanted: Vec<&str> = ingredients
            .iter()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .collect();

        let Some((first, rest)) = wanted.split_first() else {
            return Vec::new();
        };

        // First ingredient seeds the accumulator; each further ingredient
        // narrows it. Per-ingredient fetch failure yields an empty set and
        // therefore an empty intersection, which is the degraded answer.
        let mut ids = self.ids_for_ingredient(first, cancel).await;
        for ingredient in rest {
            if ids.is_empty() {
                break;
            }
            let other: HashSet<String> =
                self.ids_for_ingredient(ingredient, cancel).await.into_iter().collect();
            ids = intersect_ids(ids, &other);
        }

        ids.truncate(limit);
        if ids.is_empty() {
            return Vec::new();
        }

        self.lookup_details(&ids, cancel).await
    }
}

/// Keep only the accumulator ids also present in `other`, preserving the
/// accumulator's order
fn intersect_ids(mut acc: Vec<String>, other: &HashSet<String>) -> Vec<String> {
    acc.retain(|id| other.contains(id));
    acc
}

fn is_alcohol_filter(tag: &str) -> bool {
    ALCOHOL_FILTER_TAGS
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(tag))
}

#[derive(Debug, Deserialize)]
struct DrinkList {
    drinks: Option<Vec<Drink>>,
}

#[derive(Debug, Deserialize)]
struct StubList {
    drinks: Option<Vec<DrinkStub>>,
}

#[derive(Debug, Deserialize)]
struct DrinkStub {
    #[serde(rename = "idDrink")]
    id: String,
}

/// Full drink payload. Ingredients and measures arrive as fifteen numbered
/// columns; `ingredient_slots` rebuilds them as an ordered slot table.
#[derive(Debug, Default, Deserialize)]
struct Drink {
    #[serde(rename = "idDrink")]
    id: String,
    #[serde(rename = "strDrink")]
    name: String,
    #[serde(rename = "strDrinkThumb")]
    thumb: Option<String>,
    #[serde(rename = "strInstructions")]
    instructions: Option<String>,
    #[serde(rename = "strIngredient1")]
    ingredient1: Option<String>,
    #[serde(rename = "strIngredient2")]
    ingredient2: Option<String>,
    #[serde(rename = "strIngredient3")]
    ingredient3: Option<String>,
    #[serde(rename = "strIngredient4")]
    ingredient4: Option<String>,
    #[serde(rename = "strIngredient5")]
    ingredient5: Option<String>,
    #[serde(rename = "strIngredient6")]
    ingredient6: Option<String>,
    #[serde(rename = "strIngredient7")]
    ingredient7: Option<String>,
    #[serde(rename = "strIngredient8")]
    ingredient8: Option<String>,
    #[serde(rename = "strIngredient9")]
    ingredient9: Option<String>,
    #[serde(rename = "strIngredient10")]
    ingredient10: Option<String>,
    #[serde(rename = "strIngredient11")]
    ingredient11: Option<String>,
    #[serde(rename = "strIngredient12")]
    ingredient12: Option<String>,
    #[serde(rename = "strIngredient13")]
    ingredient13: Option<String>,
    #[serde(rename = "strIngredient14")]
    ingredient14: Option<String>,
    #[serde(rename = "strIngredient15")]
    ingredient15: Option<String>,
    #[serde(rename = "strMeasure1")]
    measure1: Option<String>,
    #[serde(rename = "strMeasure2")]
    measure2: Option<String>,
    #[serde(rename = "strMeasure3")]
    measure3: Option<String>,
    #[serde(rename = "strMeasure4")]
    measure4: Option<String>,
    #[serde(rename = "strMeasure5")]
    measure5: Option<String>,
    #[serde(rename = "strMeasure6")]
    measure6: Option<String>,
    #[serde(rename = "strMeasure7")]
    measure7: Option<String>,
    #[serde(rename = "strMeasure8")]
    measure8: Option<String>,
    #[serde(rename = "strMeasure9")]
    measure9: Option<String>,
    #[serde(rename = "strMeasure10")]
    measure10: Option<String>,
    #[serde(rename = "strMeasure11")]
    measure11: Option<String>,
    #[serde(rename = "strMeasure12")]
    measure12: Option<String>,
    #[serde(rename = "strMeasure13")]
    measure13: Option<String>,
    #[serde(rename = "strMeasure14")]
    measure14: Option<String>,
    #[serde(rename = "strMeasure15")]
    measure15: Option<String>,
}

impl Drink {
    /// Ordered (ingredient, measure) slot table
    fn ingredient_slots(&self) -> [(Option<&str>, Option<&str>); MAX_INGREDIENT_SLOTS] {
        [
            (self.ingredient1.as_deref(), self.measure1.as_deref()),
            (self.ingredient2.as_deref(), self.measure2.as_deref()),
            (self.ingredient3.as_deref(), self.measure3.as_deref()),
            (self.ingredient4.as_deref(), self.measure4.as_deref()),
            (self.ingredient5.as_deref(), self.measure5.as_deref()),
            (self.ingredient6.as_deref(), self.measure6.as_deref()),
            (self.ingredient7.as_deref(), self.measure7.as_deref()),
            (self.ingredient8.as_deref(), self.measure8.as_deref()),
            (self.ingredient9.as_deref(), self.measure9.as_deref()),
            (self.ingredient10.as_deref(), self.measure10.as_deref()),
            (self.ingredient11.as_deref(), self.measure11.as_deref()),
            (self.ingredient12.as_deref(), self.measure12.as_deref()),
            (self.ingredient13.as_deref(), self.measure13.as_deref()),
            (self.ingredient14.as_deref(), self.measure14.as_deref()),
            (self.ingredient15.as_deref(), self.measure15.as_deref()),
        ]
    }

    /// Normalize into the provider-agnostic record shape.
    ///
    /// A blank ingredient skips the slot; a present measure is prepended to
    /// the ingredient name; slot order is preserved.
    fn into_record(self) -> ExternalRecord {
        let mut ingredients = Vec::new();
        for (ingredient, measure) in self.ingredient_slots() {
            let Some(ingredient) = ingredient.map(str::trim).filter(|i| !i.is_empty()) else {
                continue;
            };
            match measure.map(str::trim).filter(|m| !m.is_empty()) {
                Some(measure) => ingredients.push(format!("{measure} {ingredient}")),
                None => ingredients.push(ingredient.to_string()),
            }
        }

        let instructions = self
            .instructions
            .as_deref()
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .unwrap_or("—")
            .to_string();

        ExternalRecord {
            provider: PROVIDER_ID,
            external_id: self.id,
            title: self.name,
            image_url: self.thumb.unwrap_or_default(),
            instructions,
            ingredients,
        }
    }
}
