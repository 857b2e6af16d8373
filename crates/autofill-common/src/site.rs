use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Coarse site category derived from the page host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SiteId {
    Linkedin,
    Indeed,
    Glassdoor,
    Monster,
    Ziprecruiter,
    Jobvite,
    Workday,
    Greenhouse,
    Lever,
    Bamboohr,
    CareersPage,
    #[default]
    Generic,
}

/// Host fragment → site, checked in order with substring matching.
const KNOWN_SITES: &[(&str, SiteId)] = &[
    ("linkedin.com", SiteId::Linkedin),
    ("indeed.com", SiteId::Indeed),
    ("glassdoor.com", SiteId::Glassdoor),
    ("monster.com", SiteId::Monster),
    ("ziprecruiter.com", SiteId::Ziprecruiter),
    ("jobvite.com", SiteId::Jobvite),
    ("workday.com", SiteId::Workday),
    ("greenhouse.io", SiteId::Greenhouse),
    ("lever.co", SiteId::Lever),
    ("bamboohr.com", SiteId::Bamboohr),
    ("careers-page.com", SiteId::CareersPage),
];

impl SiteId {
    /// Identify a site from a full URL or a bare host name.
    pub fn identify(url_or_host: &str) -> SiteId {
        let host = match Url::parse(url_or_host) {
            Ok(url) => url.host_str().unwrap_or_default().to_lowercase(),
            Err(_) => url_or_host.trim().to_lowercase(),
        };
        if host.is_empty() {
            return SiteId::Generic;
        }

        KNOWN_SITES
            .iter()
            .find(|(domain, _)| host.contains(domain))
            .map(|(_, site)| *site)
            .unwrap_or(SiteId::Generic)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SiteId::Linkedin => "linkedin",
            SiteId::Indeed => "indeed",
            SiteId::Glassdoor => "glassdoor",
            SiteId::Monster => "monster",
            SiteId::Ziprecruiter => "ziprecruiter",
            SiteId::Jobvite => "jobvite",
            SiteId::Workday => "workday",
            SiteId::Greenhouse => "greenhouse",
            SiteId::Lever => "lever",
            SiteId::Bamboohr => "bamboohr",
            SiteId::CareersPage => "careers-page",
            SiteId::Generic => "generic",
        }
    }

    /// Hosts worth starting a session on. Careers-page hosts only get selector overrides.
    pub fn is_job_board(&self) -> bool {
        !matches!(self, SiteId::Generic | SiteId::CareersPage)
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifies_hosts_and_urls() {
        assert_eq!(
            SiteId::identify("https://www.linkedin.com/jobs/view/1"),
            SiteId::Linkedin
        );
        assert_eq!(SiteId::identify("acme.wd5.myworkday.com"), SiteId::Workday);
        assert_eq!(
            SiteId::identify("https://boards.greenhouse.io/acme"),
            SiteId::Greenhouse
        );
        assert_eq!(
            SiteId::identify("https://jobs.CAREERS-PAGE.com/x"),
            SiteId::CareersPage
        );
    }

    #[test]
    fn unknown_or_empty_falls_back_to_generic() {
        assert_eq!(SiteId::identify("https://example.org/apply"), SiteId::Generic);
        assert_eq!(SiteId::identify(""), SiteId::Generic);
        assert_eq!(SiteId::identify("file:///tmp/form.html"), SiteId::Generic);
        assert!(!SiteId::Generic.is_job_board());
        assert!(SiteId::Lever.is_job_board());
        assert!(!SiteId::CareersPage.is_job_board());
    }

    #[test]
    fn serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&SiteId::CareersPage).unwrap(),
            "\"careers-page\""
        );
    }
}
