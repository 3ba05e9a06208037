use url::Url;

struct PlatformPattern {
    host_suffix: &'static str,
    key: &'static str,
}

/// Ordered platform table: more specific host patterns first, first match
/// wins. Several suffixes can map to the same key because an ATS often
/// serves applications from more than one domain.
const PLATFORM_PATTERNS: &[PlatformPattern] = &[
    PlatformPattern {
        host_suffix: "boards.greenhouse.io",
        key: "greenhouse:application",
    },
    PlatformPattern {
        host_suffix: "greenhouse.io",
        key: "greenhouse:application",
    },
    PlatformPattern {
        host_suffix: "jobs.lever.co",
        key: "lever:application",
    },
    PlatformPattern {
        host_suffix: "lever.co",
        key: "lever:application",
    },
    PlatformPattern {
        host_suffix: "myworkdayjobs.com",
        key: "workday:application",
    },
    PlatformPattern {
        host_suffix: "workday.com",
        key: "workday:application",
    },
    PlatformPattern {
        host_suffix: "jobs.ashbyhq.com",
        key: "ashby:application",
    },
    PlatformPattern {
        host_suffix: "ashbyhq.com",
        key: "ashby:application",
    },
    PlatformPattern {
        host_suffix: "smartrecruiters.com",
        key: "smartrecruiters:application",
    },
    PlatformPattern {
        host_suffix: "apply.workable.com",
        key: "workable:application",
    },
    PlatformPattern {
        host_suffix: "workable.com",
        key: "workable:application",
    },
    PlatformPattern {
        host_suffix: "bamboohr.com",
        key: "bamboohr:application",
    },
    PlatformPattern {
        host_suffix: "icims.com",
        key: "icims:application",
    },
    PlatformPattern {
        host_suffix: "teamtailor.com",
        key: "teamtailor:application",
    },
    PlatformPattern {
        host_suffix: "hh.ru",
        key: "hh:application",
    },
];

/// Derive the template-cache key for a page URL. Pure function of the URL's
/// host pattern; `None` means "unknown platform, do not use the cache".
pub fn derive_key(page_url: &str) -> Option<String> {
    let parsed = Url::parse(page_url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();

    PLATFORM_PATTERNS
        .iter()
        .find(|p| host_matches(&host, p.host_suffix))
        .map(|p| p.key.to_string())
}

fn host_matches(host: &str, suffix: &str) -> bool {
    host.strip_suffix(suffix)
        .is_some_and(|rest| rest.is_empty() || rest.ends_with('.'))
}
