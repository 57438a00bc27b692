//! 站点凭据

use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;

pub const DEFAULT_BASE_URI: &str = "https://api.percipio.com";

/// 配置中的站点信息，orgid / bearer 可能缺失
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SiteCredentials {
    /// API 根地址
    pub baseuri: String,
    /// 组织ID
    pub orgid: Option<String>,
    /// Bearer Token
    pub bearer: Option<String>,
}

impl Default for SiteCredentials {
    fn default() -> Self {
        Self {
            baseuri: DEFAULT_BASE_URI.to_string(),
            orgid: None,
            bearer: None,
        }
    }
}

// bearer 不进日志
impl fmt::Debug for SiteCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteCredentials")
            .field("baseuri", &self.baseuri)
            .field("orgid", &self.orgid)
            .field("bearer", &self.bearer.as_ref().map(|_| "***"))
            .finish()
    }
}

impl SiteCredentials {
    pub fn new(
        baseuri: impl Into<String>,
        orgid: Option<String>,
        bearer: Option<String>,
    ) -> Self {
        Self {
            baseuri: baseuri.into(),
            orgid,
            bearer,
        }
    }

    /// 检查 orgid 和 bearer 都不为空
    pub fn validate(&self) -> Result<VerifiedSite, ConfigError> {
        let orgid = non_blank(self.orgid.as_deref()).ok_or(ConfigError::MissingOrgId)?;
        let bearer = non_blank(self.bearer.as_deref()).ok_or(ConfigError::MissingBearer)?;

        Ok(VerifiedSite {
            baseuri: self.baseuri.trim_end_matches('/').to_string(),
            orgid: orgid.to_string(),
            bearer: bearer.to_string(),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// 通过校验的站点信息，只有拿到它才能发起请求
#[derive(Clone, PartialEq, Eq)]
pub struct VerifiedSite {
    baseuri: String,
    orgid: String,
    bearer: String,
}

impl VerifiedSite {
    pub fn bearer(&self) -> &str {
        &self.bearer
    }

    /// `{baseuri}/reporting/v1/organizations/{orgid}/report-requests/{tail}`
    pub fn report_requests_url(&self, tail: &str) -> String {
        format!(
            "{}/reporting/v1/organizations/{}/report-requests/{}",
            self.baseuri, self.orgid, tail
        )
    }
}

impl fmt::Debug for VerifiedSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifiedSite")
            .field("baseuri", &self.baseuri)
            .field("orgid", &self.orgid)
            .finish_non_exhaustive()
    }
}
