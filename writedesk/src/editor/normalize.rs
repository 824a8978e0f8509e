//! Turning submitted fields into an article candidate.

use crate::callbacks::{CallbackArgs, CallbackRegistry, Phase};
use crate::config::Preferences;
use crate::core::{names, Article, ArticleStatus, FormFields};
use crate::textfilter::TextFilterSet;
use crate::utils::{
    compose_timestamp, compose_timestamp_with_defaults, escape_html, normalize_keywords,
    sanitize_for_url, strip_space, Timestamp,
};

/// Derives a URL title from `title`.
///
/// A `sanitize_for_url` handler may supply the slug; otherwise the built-in
/// sanitizer runs.
#[must_use]
pub fn derive_url_title(callbacks: &CallbackRegistry, prefs: &Preferences, title: &str) -> String {
    let plugged = callbacks.dispatch(
        &CallbackArgs::new("sanitize_for_url", "").with_default(title),
        Phase::After,
    );
    let sanitized = if plugged.is_empty() {
        sanitize_for_url(title)
    } else {
        plugged
    };
    strip_space(&sanitized, prefs.permalink_title_format)
}

/// Decides whether a save should re-derive the URL title.
///
/// True when the submitted URL title is empty, or when the stored article
/// is unpublished, its URL title was never customized, the form left it
/// untouched and the title changed.
#[must_use]
pub fn should_rederive_url_title(
    submitted_url_title: &str,
    submitted_title: &str,
    stored: &Article,
    derived_from_stored_title: &str,
) -> bool {
    submitted_url_title.is_empty()
        || (!stored.status.is_public()
            && stored.url_title == submitted_url_title
            && stored.url_title == derived_from_stored_title
            && stored.title != submitted_title)
}

/// Builds the content part of an article from submitted fields.
///
/// Timestamps, authorship and identity are left for the caller. The status
/// falls back to Draft when unparsable; validation reports it.
#[must_use]
pub fn candidate(fields: &FormFields, prefs: &Preferences, filters: &TextFilterSet) -> Article {
    let title = fields.get(names::TITLE).to_string();
    let body = fields.get(names::BODY).to_string();
    let excerpt = fields.get(names::EXCERPT).to_string();
    let body_filter = fields.get(names::BODY_FILTER).to_string();
    let excerpt_filter = fields.get(names::EXCERPT_FILTER).to_string();

    Article {
        title_html: escape_html(&title),
        body_html: filters.filter(&body_filter, &body),
        excerpt_html: filters.filter(&excerpt_filter, &excerpt),
        title,
        body,
        excerpt,
        body_filter,
        excerpt_filter,
        image: fields.get(names::IMAGE).trim().to_string(),
        keywords: normalize_keywords(fields.get(names::KEYWORDS)),
        status: ArticleStatus::from_form(fields.get(names::STATUS)).unwrap_or(ArticleStatus::Draft),
        section: fields.get(names::SECTION).to_string(),
        category1: fields.get(names::CATEGORY1).to_string(),
        category2: fields.get(names::CATEGORY2).to_string(),
        annotate: fields.is_checked(names::ANNOTATE),
        annotate_invite: fields.get(names::ANNOTATE_INVITE).to_string(),
        override_form: fields.get(names::OVERRIDE_FORM).trim().to_string(),
        url_title: fields.get(names::URL_TITLE).trim().to_string(),
        custom_fields: prefs
            .active_custom_fields()
            .map(|n| (n, fields.get(&names::custom(n)).to_string()))
            .collect(),
        ..Article::default()
    }
}

/// Reads the post time from the date sub-fields.
pub fn posted_from_fields(fields: &FormFields, prefs: &Preferences) -> Option<Timestamp> {
    compose_timestamp(
        names::POSTED_PARTS,
        names::POSTED_PARTS.map(|n| fields.get(n)),
        prefs.gmt_offset_seconds,
    )
    .ok()
}

/// Reads the expiry from the expiry sub-fields.
///
/// `Ok(None)` when no year was given; `Err(())` when the parts do not
/// compose. A composed value of zero means unset.
pub fn expires_from_fields(
    fields: &FormFields,
    prefs: &Preferences,
) -> Result<Option<Timestamp>, ()> {
    if fields.get(names::EXPIRES_PARTS[0]).trim().is_empty() {
        return Ok(None);
    }
    compose_timestamp_with_defaults(
        names::EXPIRES_PARTS,
        names::EXPIRES_PARTS.map(|n| fields.get(n)),
        prefs.gmt_offset_seconds,
    )
    .map(|ts| (ts != 0).then_some(ts))
    .map_err(|_| ())
}

/// Flattens a stored article into form fields.
#[must_use]
pub fn article_fields(article: &Article) -> FormFields {
    let mut fields = FormFields::new()
        .with(names::ID, article.id.to_string())
        .with(names::TITLE, &article.title)
        .with(names::BODY, &article.body)
        .with(names::EXCERPT, &article.excerpt)
        .with(names::BODY_FILTER, &article.body_filter)
        .with(names::EXCERPT_FILTER, &article.excerpt_filter)
        .with(names::IMAGE, &article.image)
        .with(names::KEYWORDS, &article.keywords)
        .with(names::STATUS, article.status.code().to_string())
        .with(names::SECTION, &article.section)
        .with(names::CATEGORY1, &article.category1)
        .with(names::CATEGORY2, &article.category2)
        .with(names::ANNOTATE, if article.annotate { "1" } else { "0" })
        .with(names::ANNOTATE_INVITE, &article.annotate_invite)
        .with(names::OVERRIDE_FORM, &article.override_form)
        .with(names::URL_TITLE, &article.url_title)
        .with(names::AUTHOR_ID, &article.author_id)
        .with(names::LAST_MOD_ID, &article.last_modified_by)
        .with(names::S_POSTED, article.posted.to_string())
        .with(names::S_LAST_MOD, article.last_modified.to_string())
        .with(
            names::S_EXPIRES,
            article.expires.map(|e| e.to_string()).unwrap_or_default(),
        );
    for (num, value) in &article.custom_fields {
        fields.set(names::custom(*num), value);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::Handler;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_derive_url_title() {
        let prefs = Preferences::default();
        let callbacks = CallbackRegistry::new();
        assert_eq!(derive_url_title(&callbacks, &prefs, "Hello World!"), "hello-world");

        let squashed = Preferences {
            permalink_title_format: false,
            ..Preferences::default()
        };
        assert_eq!(derive_url_title(&callbacks, &squashed, "Hello World"), "HelloWorld");
    }

    #[test]
    fn test_sanitize_hook_overrides() {
        let prefs = Preferences::default();
        let mut callbacks = CallbackRegistry::new();
        callbacks.register(
            "sanitize_for_url",
            "",
            Phase::After,
            Handler::text(|args| format!("-x-{}-", args.default.unwrap_or("").len())),
        );
        assert_eq!(derive_url_title(&callbacks, &prefs, "abc"), "x-3");
    }

    #[test]
    fn test_rederive_rule() {
        let stored = Article {
            title: "Old".into(),
            url_title: "old".into(),
            status: ArticleStatus::Draft,
            ..Article::default()
        };
        assert!(should_rederive_url_title("", "New", &stored, "old"));
        assert!(should_rederive_url_title("old", "New", &stored, "old"));
        // Customized slug survives.
        assert!(!should_rederive_url_title("old", "New", &stored, "something-else"));
        // Title unchanged.
        assert!(!should_rederive_url_title("old", "Old", &stored, "old"));

        let live = Article {
            status: ArticleStatus::Live,
            ..stored
        };
        assert!(!should_rederive_url_title("old", "New", &live, "old"));
    }

    #[test]
    fn test_candidate_normalizes() {
        let prefs = Preferences::default().with_custom_field(2, "Mood");
        let filters = TextFilterSet::new();
        let fields = FormFields::new()
            .with("Title", "A & B")
            .with("Body", "one\ntwo")
            .with("textile_body", "2")
            .with("Keywords", " red ,  green,,blue ")
            .with("Status", "5")
            .with("Annotate", "1")
            .with("custom_2", "happy");

        let article = candidate(&fields, &prefs, &filters);
        assert_eq!(article.title_html, "A &amp; B");
        assert_eq!(article.body_html, "one<br />\ntwo");
        assert_eq!(article.keywords, "red,green,blue");
        assert_eq!(article.status, ArticleStatus::Sticky);
        assert!(article.annotate);
        assert_eq!(article.custom_field(2), "happy");
    }

    #[test]
    fn test_expires_from_fields() {
        let prefs = Preferences::default();
        assert_eq!(expires_from_fields(&FormFields::new(), &prefs), Ok(None));

        let fields = FormFields::new().with("exp_year", "2024");
        assert_eq!(expires_from_fields(&fields, &prefs), Ok(Some(1_704_067_200)));

        let bad = FormFields::new().with("exp_year", "2024").with("exp_month", "13");
        assert_eq!(expires_from_fields(&bad, &prefs), Err(()));

        let zeroes = FormFields::new()
            .with("exp_year", "2024")
            .with("exp_month", "0")
            .with("exp_day", "0");
        assert_eq!(expires_from_fields(&zeroes, &prefs), Ok(Some(1_704_067_200)));
    }

    #[test]
    fn test_article_fields() {
        let mut article = Article {
            id: 9,
            title: "T".into(),
            posted: 100,
            last_modified: 200,
            expires: None,
            ..Article::default()
        };
        article.custom_fields.insert(1, "c".into());
        let fields = article_fields(&article);
        assert_eq!(fields.get("ID"), "9");
        assert_eq!(fields.get("sPosted"), "100");
        assert_eq!(fields.get("sLastMod"), "200");
        assert_eq!(fields.get("sExpires"), "");
        assert_eq!(fields.get("Status"), "4");
        assert_eq!(fields.get("custom_1"), "c");
    }
}
