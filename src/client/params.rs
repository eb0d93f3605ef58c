use log::debug;
use reqwest::Url;
use std::time::Duration;

pub const HOME_ROUTE: &str = "/";
pub const VERIFY_ROUTE: &str = "/verify";
pub const SUCCESS_ROUTE: &str = "/success";

/// How long the success notice stays up before navigating away.
pub const SUCCESS_REDIRECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: String,
    pub after: Duration,
}

impl Redirect {
    pub fn to(path: impl Into<String>) -> Self {
        Self::delayed(path, Duration::ZERO)
    }

    pub fn delayed(path: impl Into<String>, after: Duration) -> Self {
        Self {
            to: path.into(),
            after,
        }
    }

    /// Waits out the delay and yields the target path.
    pub async fn follow(self) -> String {
        if !self.after.is_zero() {
            tokio::time::sleep(self.after).await;
        }
        self.to
    }
}

/// The identifiers the verification page needs from its query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyParams {
    pub email: String,
    pub temp_id: String,
    pub phone_number: String,
}

impl VerifyParams {
    /// Missing or empty parameters send the visitor home.
    pub fn from_url(url: &Url) -> Result<Self, Redirect> {
        let param = |key: &str| {
            url.query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
                .filter(|v| !v.is_empty())
        };

        match (param("email"), param("tempId"), param("phoneNumber")) {
            (Some(email), Some(temp_id), Some(phone_number)) => Ok(Self {
                email,
                temp_id,
                phone_number,
            }),
            _ => {
                debug!("Verification parameters missing in {}", url);
                Err(Redirect::to(HOME_ROUTE))
            }
        }
    }

    /// The `/verify` page URL on `base` carrying these parameters.
    pub fn page_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        url.set_path(VERIFY_ROUTE);
        url.query_pairs_mut()
            .clear()
            .append_pair("email", &self.email)
            .append_pair("tempId", &self.temp_id)
            .append_pair("phoneNumber", &self.phone_number);
        url
    }
}
