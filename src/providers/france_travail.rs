use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::models::job_alert::JobAlert;
use crate::models::listing::{
    Listing, COMPANY_NOT_SPECIFIED, DESCRIPTION_NOT_AVAILABLE, LOCATION_NOT_SPECIFIED,
};
use crate::providers::{scoring, JobProvider, RESULTS_PER_PAGE};

const OAUTH_SCOPE: &str = "api_offresdemploiv2 o2dsoffre";
/// Refresh the cached token this long before its declared expiry.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct FtSearchResponse {
    #[serde(default)]
    resultats: Vec<FtOffer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FtOffer {
    pub id: String,
    pub intitule: String,
    pub entreprise: Option<FtCompany>,
    pub lieu_travail: Option<FtPlace>,
    pub salaire: Option<FtSalary>,
    pub type_contrat: Option<String>,
    pub description: Option<String>,
    pub origine_offre: Option<FtOrigin>,
    pub date_creation: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FtCompany {
    pub nom: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FtPlace {
    pub libelle: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FtSalary {
    pub libelle: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FtOrigin {
    pub url_origine: Option<String>,
}

#[derive(Clone)]
pub struct FranceTravailProvider {
    client: Client,
    client_id: String,
    client_secret: String,
    base_url: String,
    token_url: String,
    // Read-mostly cache; a redundant refresh under contention is harmless.
    token: Arc<RwLock<Option<CachedToken>>>,
}

impl FranceTravailProvider {
    pub fn from_config(config: &Config) -> Option<Self> {
        let client_id = config.france_travail_client_id.clone()?;
        let client_secret = config.france_travail_client_secret.clone()?;
        Some(Self {
            client: Client::new(),
            client_id,
            client_secret,
            base_url: config.france_travail_base_url.clone(),
            token_url: config.france_travail_token_url.clone(),
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Map a user-facing contract label to the provider's search codes.
    pub(crate) fn request_contract_code(contract: &str) -> String {
        match contract {
            "CDI" => "CDI",
            "CDD" => "CDD",
            "Stage" => "MIS,DIN",
            "Alternance" => "SAI",
            "Freelance" => "LIB",
            other => other,
        }
        .to_string()
    }

    /// Normalize the provider's contract code into a human-readable label.
    pub(crate) fn normalize_contract(code: &str) -> String {
        match code {
            "CDI" => "CDI",
            "CDD" => "CDD",
            "MIS" => "Intérim",
            "SAI" => "Alternance",
            "LIB" => "Libéral",
            "REP" => "Remplacement",
            "FRA" => "Franchise",
            other => other,
        }
        .to_string()
    }

    async fn bearer_token(&self) -> Option<String> {
        {
            let guard = self.token.read().await;
            if let Some(cached) = guard.as_ref() {
                if Utc::now() < cached.expires_at {
                    return Some(cached.token.clone());
                }
            }
        }

        match self.request_token().await {
            Ok(cached) => {
                let token = cached.token.clone();
                *self.token.write().await = Some(cached);
                info!("France Travail token refreshed");
                Some(token)
            }
            Err(e) => {
                error!(error = ?e, "France Travail token request failed");
                None
            }
        }
    }

    async fn request_token(&self) -> Result<CachedToken> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", OAUTH_SCOPE),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await?
            .error_for_status()?;

        let body: TokenResponse = response.json().await?;
        Ok(CachedToken {
            token: body.access_token,
            expires_at: Utc::now()
                + Duration::seconds(body.expires_in - TOKEN_REFRESH_MARGIN_SECS),
        })
    }

    async fn fetch(&self, alert: &JobAlert, token: &str) -> Result<Vec<FtOffer>> {
        let keywords = alert.keywords.join(" ");
        let range = format!("0-{}", RESULTS_PER_PAGE - 1);

        let mut request = self
            .client
            .get(&self.base_url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("motsCles", keywords.as_str()),
                ("range", range.as_str()),
                ("sort", "1"),
            ]);

        if let Some(location) = &alert.location {
            request = request.query(&[("commune", location.as_str())]);
        }
        if let Some(contract) = &alert.contract {
            let code = Self::request_contract_code(contract);
            request = request.query(&[("typeContrat", code.as_str())]);
        }

        let response = request.send().await?.error_for_status()?;
        let body: FtSearchResponse = response.json().await?;
        Ok(body.resultats)
    }

    pub(crate) fn map_listing(alert: &JobAlert, offer: FtOffer) -> Listing {
        let fallback_url = format!(
            "https://candidat.francetravail.fr/offres/recherche/detail/{}",
            offer.id
        );
        let mut listing = Listing {
            external_id: format!("francetravail_{}", offer.id),
            title: offer.intitule,
            company: offer
                .entreprise
                .and_then(|e| e.nom)
                .unwrap_or_else(|| COMPANY_NOT_SPECIFIED.to_string()),
            location: offer
                .lieu_travail
                .and_then(|l| l.libelle)
                .unwrap_or_else(|| LOCATION_NOT_SPECIFIED.to_string()),
            salary: offer.salaire.and_then(|s| s.libelle),
            contract: offer
                .type_contrat
                .map(|code| Self::normalize_contract(&code)),
            description: offer
                .description
                .unwrap_or_else(|| DESCRIPTION_NOT_AVAILABLE.to_string()),
            url: offer
                .origine_offre
                .and_then(|o| o.url_origine)
                .unwrap_or(fallback_url),
            source: "France Travail".to_string(),
            published_at: offer.date_creation.unwrap_or_else(Utc::now),
            match_score: 0,
        };
        listing.match_score = scoring::match_score(alert, &listing);
        listing
    }
}

#[async_trait]
impl JobProvider for FranceTravailProvider {
    fn name(&self) -> &'static str {
        "France Travail"
    }

    async fn search(&self, alert: &JobAlert) -> Vec<Listing> {
        if alert.keywords.is_empty() {
            warn!(alert_id = %alert.id, "Alert has no keywords, skipping France Travail search");
            return Vec::new();
        }

        let Some(token) = self.bearer_token().await else {
            warn!(alert_id = %alert.id, "France Travail unavailable: no bearer token");
            return Vec::new();
        };

        match self.fetch(alert, &token).await {
            Ok(offers) => {
                info!(alert_id = %alert.id, found = offers.len(), "France Travail search finished");
                offers
                    .into_iter()
                    .map(|offer| Self::map_listing(alert, offer))
                    .collect()
            }
            Err(e) => {
                error!(alert_id = %alert.id, error = ?e, "France Travail search failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn request_contract_codes_cover_the_known_labels() {
        assert_eq!(FranceTravailProvider::request_contract_code("CDI"), "CDI");
        assert_eq!(
            FranceTravailProvider::request_contract_code("Stage"),
            "MIS,DIN"
        );
        assert_eq!(
            FranceTravailProvider::request_contract_code("Alternance"),
            "SAI"
        );
        assert_eq!(
            FranceTravailProvider::request_contract_code("Freelance"),
            "LIB"
        );
        // Unknown labels pass through unchanged.
        assert_eq!(
            FranceTravailProvider::request_contract_code("Autre"),
            "Autre"
        );
    }

    #[test]
    fn response_contract_codes_are_normalized() {
        assert_eq!(FranceTravailProvider::normalize_contract("MIS"), "Intérim");
        assert_eq!(
            FranceTravailProvider::normalize_contract("SAI"),
            "Alternance"
        );
        assert_eq!(FranceTravailProvider::normalize_contract("LIB"), "Libéral");
        assert_eq!(
            FranceTravailProvider::normalize_contract("REP"),
            "Remplacement"
        );
        assert_eq!(FranceTravailProvider::normalize_contract("XYZ"), "XYZ");
    }

    #[test]
    fn offer_without_origin_url_falls_back_to_the_portal_link() {
        let alert = JobAlert {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Backend".to_string(),
            keywords: vec!["rust".to_string()],
            location: None,
            company: None,
            salary: None,
            contract: None,
            frequency: "daily".to_string(),
            active: true,
            last_check: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let raw = serde_json::json!({
            "id": "198XYZW",
            "intitule": "Développeur Rust",
            "typeContrat": "MIS"
        });
        let offer: FtOffer = serde_json::from_value(raw).unwrap();
        let listing = FranceTravailProvider::map_listing(&alert, offer);

        assert_eq!(listing.external_id, "francetravail_198XYZW");
        assert_eq!(
            listing.url,
            "https://candidat.francetravail.fr/offres/recherche/detail/198XYZW"
        );
        assert_eq!(listing.contract.as_deref(), Some("Intérim"));
        assert_eq!(listing.company, COMPANY_NOT_SPECIFIED);
        assert_eq!(listing.source, "France Travail");
    }
}
