//! The editor's screen regions and their producers.

use crate::config::Preferences;
use crate::core::{names, ArticleStatus};
use crate::errors::RenderError;
use crate::partials::{Region, RegionInput, RegionMode, RegionRegistry, RenderEnv, View};
use crate::textfilter::LEAVE_TEXT_UNTOUCHED;
use crate::utils::html::{
    checkbox, graf, hidden_input, href, label, radio, select, tag, text_input, textarea, void_tag,
};
use crate::utils::{display_keywords, escape_html, format_local};

type Produced = Result<String, RenderError>;

/// Wraps content in a collapsible pane with a heading.
#[must_use]
pub fn wrap_region(id: &str, content: &str, pane: &str, heading: &str) -> String {
    let body = if pane.is_empty() {
        content.to_string()
    } else {
        tag("div", content, &[("class", "toggle"), ("id", pane)])
    };
    let inner = format!("{}{body}", tag("h3", &escape_html(heading), &[("class", "txp-summary")]));
    tag("section", &inner, &[("class", "txp-details"), ("id", id)])
}

/// Builds the region registry for one request.
///
/// Every active custom field adds a `custom_field_N` fragment and a
/// `custom_N` value region.
#[must_use]
pub fn default_regions(prefs: &Preferences) -> RegionRegistry {
    use RegionMode::{Static, Volatile, VolatileValue};

    let mut regions = RegionRegistry::new();
    let table: [(&str, RegionMode, &str, fn(&RegionInput<'_>) -> Produced); 24] = [
        (names::S_LAST_MOD, VolatileValue, "[name=sLastMod]", value),
        (names::S_POSTED, VolatileValue, "[name=sPosted]", value),
        ("sidehelp", Volatile, "#textfilter_group", sidehelp),
        ("custom_fields", Static, "#custom_field_group", custom_fields),
        ("image", Static, "#image_group", image),
        ("keywords", Static, "p.keywords", keywords),
        ("keywords_value", VolatileValue, "#keywords", keywords_value),
        ("url_title", Static, "p.url-title", url_title),
        ("url_title_value", VolatileValue, "#url-title", url_title_value),
        ("recent_articles", Volatile, "#recent_group .recent", recent_articles),
        ("title", Static, "p.title", title),
        ("title_value", VolatileValue, "#title", title_value),
        ("article_view", Volatile, "#article_partial_article_view", article_view),
        ("body", Static, "p.body", body),
        ("excerpt", Static, "p.excerpt", excerpt),
        ("author", Volatile, "p.author", author),
        ("view_modes", Volatile, "#view_modes", view_modes),
        ("article_nav", Volatile, "p.nav-tertiary", article_nav),
        ("status", Volatile, "#write-status", status),
        ("categories", Static, "#categories_group", categories),
        ("section", Static, "p.section", section),
        ("comments", Volatile, "#write-comments", comments),
        ("posted", Volatile, "#write-timestamp", posted),
        ("expires", Volatile, "#write-expires", expires),
    ];
    for (key, mode, selector, producer) in table {
        regions.insert(Region::new(key, mode, selector, producer));
    }

    for num in prefs.active_custom_fields() {
        regions.insert(Region::new(
            format!("custom_field_{num}"),
            Static,
            format!("p.custom-field.custom-{num}"),
            custom_field,
        ));
        regions.insert(Region::new(
            names::custom(num),
            Static,
            format!("#custom-{num}"),
            value,
        ));
    }
    regions
}

/// Echoes the view-state field named like the region.
fn value(input: &RegionInput<'_>) -> Produced {
    Ok(input.state.get(input.key).to_string())
}

fn ui(input: &RegionInput<'_>, element: &str, default: &str) -> String {
    input.env.pluggable_ui(element, default, input.state)
}

fn sidehelp(input: &RegionInput<'_>) -> Produced {
    let filters = input.env.filters;
    let body_filter = input.state.get(names::BODY_FILTER);
    let excerpt_filter = input.state.get(names::EXCERPT_FILTER);
    let mut help = filters.help(body_filter);
    if body_filter != excerpt_filter {
        help.push_str(&filters.help(excerpt_filter));
    }
    let out = wrap_region(
        "textfilter_group",
        &help,
        "textfilter_help",
        &input.env.text("textfilter_help"),
    );
    Ok(ui(input, "sidehelp", &out))
}

fn custom_fields(input: &RegionInput<'_>) -> Produced {
    let mut out = String::new();
    for num in input.env.prefs.active_custom_fields() {
        out.push_str(&custom_field_markup(input, num));
    }
    let inner = ui(input, "custom_fields", &out);
    Ok(wrap_region(
        "custom_field_group",
        &inner,
        "custom_field",
        &input.env.text("custom"),
    ))
}

fn custom_field(input: &RegionInput<'_>) -> Produced {
    let num: u8 = input
        .key
        .strip_prefix("custom_field_")
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| RenderError::new(input.key, "not a custom field key"))?;
    Ok(custom_field_markup(input, num))
}

fn custom_field_markup(input: &RegionInput<'_>, num: u8) -> String {
    let Some(field_label) = input.env.prefs.custom_fields.get(&num) else {
        return String::new();
    };
    let name = names::custom(num);
    let id = format!("custom-{num}");
    graf(
        &format!(
            "{}<br />{}",
            label(field_label, &id),
            text_input(&name, input.state.get(&name), &id)
        ),
        &format!("custom-field custom-{num}"),
    )
}

fn image(input: &RegionInput<'_>) -> Produced {
    let default = graf(
        &format!(
            "{}<br />{}",
            label(&input.env.text("article_image"), "article-image"),
            text_input(names::IMAGE, input.state.get(names::IMAGE), "article-image")
        ),
        "article-image",
    );
    Ok(wrap_region(
        "image_group",
        &ui(input, "article_image", &default),
        "image",
        &input.env.text("article_image"),
    ))
}

fn keywords(input: &RegionInput<'_>) -> Produced {
    let default = graf(
        &format!(
            "{}<br />{}",
            label(&input.env.text("keywords"), "keywords"),
            textarea(names::KEYWORDS, &keywords_value(input)?, "keywords")
        ),
        "keywords",
    );
    Ok(ui(input, "keywords", &default))
}

fn keywords_value(input: &RegionInput<'_>) -> Produced {
    Ok(display_keywords(input.state.get(names::KEYWORDS)))
}

fn url_title(input: &RegionInput<'_>) -> Produced {
    let default = graf(
        &format!(
            "{}<br />{}",
            label(&input.env.text("url_title"), "url-title"),
            text_input(names::URL_TITLE, &url_title_value(input)?, "url-title")
        ),
        "url-title",
    );
    Ok(ui(input, "url_title", &default))
}

fn url_title_value(input: &RegionInput<'_>) -> Produced {
    Ok(input.state.get(names::URL_TITLE).to_string())
}

fn recent_articles(input: &RegionInput<'_>) -> Produced {
    let mut list = String::new();
    if !input.env.recent.is_empty() {
        let mut items = String::new();
        for recent in input.env.recent {
            let title = if recent.title.is_empty() {
                format!("{} {}", input.env.text("untitled"), recent.id)
            } else {
                recent.title.clone()
            };
            items.push_str(&tag(
                "li",
                &href(&title, &format!("?event=article&step=edit&ID={}", recent.id)),
                &[("class", "recent-article")],
            ));
        }
        list = tag("ul", &items, &[("class", "recent plain-list")]);
    }
    Ok(ui(input, "recent_articles", &list))
}

fn title(input: &RegionInput<'_>) -> Produced {
    let mut inner = format!(
        "{}<br />{}",
        label(&input.env.text("title"), "title"),
        text_input(names::TITLE, input.state.get(names::TITLE), "title")
    );
    if !input.state.is_create() {
        inner.push_str(&input.render_region("article_view")?);
    }
    Ok(ui(input, "title", &graf(&inner, "title")))
}

fn title_value(input: &RegionInput<'_>) -> Produced {
    Ok(input.state.get(names::TITLE).to_string())
}

fn article_view(input: &RegionInput<'_>) -> Produced {
    let state = input.state;
    let id = state.get_i64(names::ID).unwrap_or(0);
    let public = ArticleStatus::from_form(state.get(names::STATUS)).is_some_and(ArticleStatus::is_public);
    let url = if public {
        format!("{}index.php?id={id}", input.env.prefs.site_url)
    } else {
        // Cache buster keeps previews fresh.
        format!("?txpreview={id}.{}", input.env.now)
    };
    let link = tag(
        "a",
        &escape_html(&input.env.text("view")),
        &[("href", &url), ("class", "article-view")],
    );
    Ok(tag("span", &link, &[("id", "article_partial_article_view")]))
}

fn body(input: &RegionInput<'_>) -> Produced {
    let default = graf(
        &format!(
            "{}<br />{}",
            label(&input.env.text("body"), "body"),
            textarea(names::BODY, input.state.get(names::BODY), "body")
        ),
        "body",
    );
    Ok(ui(input, "body", &default))
}

fn excerpt(input: &RegionInput<'_>) -> Produced {
    let default = graf(
        &format!(
            "{}<br />{}",
            label(&input.env.text("excerpt"), "excerpt"),
            textarea(names::EXCERPT, input.state.get(names::EXCERPT), "excerpt")
        ),
        "excerpt",
    );
    Ok(ui(input, "excerpt", &default))
}

fn author(input: &RegionInput<'_>) -> Produced {
    let state = input.state;
    let env = input.env;
    let offset = env.prefs.gmt_offset_seconds;
    let stamp = |field: &str| {
        state
            .get_i64(field)
            .map(|ts| format_local(ts, offset, "%d %b %Y &#183; %H:%M:%S"))
            .unwrap_or_default()
    };
    let mut inner = format!(
        "{}: {} &#183; {}",
        escape_html(&env.text("posted_by")),
        escape_html(state.get(names::AUTHOR_ID)),
        stamp(names::S_POSTED)
    );
    if state.get(names::S_POSTED) != state.get(names::S_LAST_MOD) {
        inner.push_str(&format!(
            "<br />{}: {} &#183; {}",
            escape_html(&env.text("modified_by")),
            escape_html(state.get(names::LAST_MOD_ID)),
            stamp(names::S_LAST_MOD)
        ));
    }
    let out = graf(&tag("small", &inner, &[]), "author");
    Ok(ui(input, "author", &out))
}

fn view_modes(input: &RegionInput<'_>) -> Produced {
    let state = input.state;
    let has_filter = if state.is_create() {
        input.env.prefs.use_textile != LEAVE_TEXT_UNTOUCHED
    } else {
        state.get(names::BODY_FILTER) != LEAVE_TEXT_UNTOUCHED
            || state.get(names::EXCERPT_FILTER) != LEAVE_TEXT_UNTOUCHED
    };
    let default = if has_filter {
        let tabs: String = View::ALL
            .iter()
            .map(|view| {
                let name = view.as_str();
                let class = if *view == state.view { "active" } else { "" };
                let link = tag(
                    "a",
                    &escape_html(&input.env.text(&format!("view_{name}"))),
                    &[("href", "#"), ("data-view", name), ("class", "view-mode")],
                );
                tag("li", &link, &[("class", class)])
            })
            .collect();
        tag("ul", &tabs, &[])
    } else {
        "&#160;".to_string()
    };
    Ok(tag(
        "div",
        &ui(input, "view", &default),
        &[("id", "view_modes")],
    ))
}

fn article_nav(input: &RegionInput<'_>) -> Produced {
    let link = |id: Option<i64>, key: &str| {
        let text = input.env.text(key);
        match id {
            Some(id) => tag(
                "a",
                &escape_html(&text),
                &[
                    ("href", &format!("?event=article&step=edit&ID={id}")),
                    ("rel", key),
                    ("class", "navlink"),
                ],
            ),
            None => tag(
                "span",
                &escape_html(&text),
                &[("class", "navlink-disabled"), ("aria-disabled", "true")],
            ),
        }
    };
    let inner = format!(
        "{}{}",
        link(input.state.prev_id, "prev"),
        link(input.state.next_id, "next")
    );
    Ok(tag(
        "p",
        &inner,
        &[("role", "navigation"), ("class", "nav-tertiary")],
    ))
}

fn status(input: &RegionInput<'_>) -> Produced {
    let current = input.state.get(names::STATUS);
    let mut list = String::new();
    for status in ArticleStatus::ALL {
        let code = status.code().to_string();
        let id = format!("status-{status}");
        list.push_str(&tag(
            "li",
            &format!(
                "{}{}",
                radio(names::STATUS, &code, current == code, &id),
                label(&input.env.text(&status.to_string()), &id)
            ),
            &[("class", "status-option")],
        ));
    }
    let out = wrap_region(
        "write-status",
        &tag("ul", &list, &[("class", "status plain-list")]),
        "",
        &input.env.text("status"),
    );
    Ok(ui(input, "status", &out))
}

fn section(input: &RegionInput<'_>) -> Produced {
    let options: Vec<(String, String)> = input
        .env
        .catalog
        .sections
        .iter()
        .map(|s| (s.clone(), s.clone()))
        .collect();
    let default = graf(
        &format!(
            "{}<br />{}",
            label(&input.env.text("section"), "section"),
            select(names::SECTION, &options, input.state.get(names::SECTION), false, "section")
        ),
        "section",
    );
    Ok(ui(input, "section", &default))
}

fn categories(input: &RegionInput<'_>) -> Produced {
    let options: Vec<(String, String)> = input
        .env
        .catalog
        .categories
        .iter()
        .map(|c| (c.clone(), c.clone()))
        .collect();
    let popup = |name: &str, key: &str, id: &str| {
        graf(
            &format!(
                "{}<br />{}",
                label(&input.env.text(key), id),
                select(name, &options, input.state.get(name), true, id)
            ),
            &format!("category {id}"),
        )
    };
    let inner = format!(
        "{}{}",
        popup(names::CATEGORY1, "category1", "category-1"),
        popup(names::CATEGORY2, "category2", "category-2")
    );
    let default = tag("div", &inner, &[("id", "categories_group")]);
    Ok(ui(input, "categories", &default))
}

fn comments(input: &RegionInput<'_>) -> Produced {
    let state = input.state;
    let prefs = input.env.prefs;
    if !prefs.use_comments {
        return Ok(tag("div", "", &[("id", "write-comments")]));
    }

    let mut expired = false;
    if !state.is_create() && prefs.comments_disabled_after > 0 {
        let lifespan = i64::from(prefs.comments_disabled_after) * 86_400;
        let posted = state.get_i64(names::S_POSTED).unwrap_or(input.env.now);
        expired = input.env.now - posted > lifespan;
    }

    let out = if expired {
        tag(
            "p",
            &escape_html(&input.env.text("expired")),
            &[("class", "comment-annotate"), ("id", "write-comments")],
        )
    } else {
        let on = state.fields.is_checked(names::ANNOTATE);
        let radios = format!(
            "{}{}{}{}",
            radio(names::ANNOTATE, "0", !on, "annotate-0"),
            label(&input.env.text("comments_off"), "annotate-0"),
            radio(names::ANNOTATE, "1", on, "annotate-1"),
            label(&input.env.text("comments_on"), "annotate-1"),
        );
        let invite = format!(
            "{}<br />{}",
            label(&input.env.text("comment_invitation"), "comment-invite"),
            text_input(
                names::ANNOTATE_INVITE,
                state.get(names::ANNOTATE_INVITE),
                "comment-invite"
            )
        );
        tag(
            "div",
            &format!(
                "{}{}",
                graf(&radios, "comment-annotate"),
                graf(&invite, "comment-invite")
            ),
            &[("id", "write-comments")],
        )
    };
    Ok(ui(input, "annotate_invite", &out))
}

/// Six text inputs for a timestamp, blank when `ts` is `None`.
fn timestamp_inputs(parts: [&str; 6], ts: Option<i64>, env: &RenderEnv<'_>) -> String {
    let formats = ["%Y", "%m", "%d", "%H", "%M", "%S"];
    let inputs: Vec<String> = parts
        .iter()
        .zip(formats)
        .map(|(name, pattern)| {
            let value = ts
                .map(|ts| format_local(ts, env.prefs.gmt_offset_seconds, pattern))
                .unwrap_or_default();
            void_tag(
                "input",
                &[
                    ("type", "text"),
                    ("name", name),
                    ("value", &value),
                    ("class", name),
                    ("size", if *name == parts[0] { "4" } else { "2" }),
                ],
            )
        })
        .collect();
    format!(
        "{}{} {}",
        graf(
            &format!(
                "{}{} / {} / {}",
                tag("span", &escape_html(&env.text("date")), &[("class", "label")]),
                inputs[0],
                inputs[1],
                inputs[2]
            ),
            "date",
        ),
        tag("span", &escape_html(&env.text("time")), &[("class", "label")]),
        format!("{} : {} : {}", inputs[3], inputs[4], inputs[5])
    )
}

fn posted(input: &RegionInput<'_>) -> Produced {
    let state = input.state;
    let env = input.env;
    let ts = state.get_i64(names::S_POSTED).or(Some(env.now));
    let (toggle, toggle_key, heading_key) = if state.is_create() {
        (names::PUBLISH_NOW, "set_to_now", "or_publish_at")
    } else {
        (names::RESET_TIME, "reset_time", "published_at")
    };
    let inner = format!(
        "{}{}{}",
        graf(
            &format!(
                "{}{}",
                checkbox(toggle, state.fields.is_checked(toggle), toggle),
                label(&env.text(toggle_key), toggle)
            ),
            &toggle.replace('_', "-"),
        ),
        graf(&escape_html(&env.text(heading_key)), "publish-at"),
        timestamp_inputs(names::POSTED_PARTS, ts, env)
    );
    let out = wrap_region("write-timestamp", &inner, "", &env.text("timestamp"));
    Ok(ui(input, "timestamp", &out))
}

fn expires(input: &RegionInput<'_>) -> Produced {
    let state = input.state;
    let ts = state.get_i64(names::S_EXPIRES);
    let inner = format!(
        "{}{}",
        timestamp_inputs(names::EXPIRES_PARTS, ts, input.env),
        hidden_input(names::S_EXPIRES, state.get(names::S_EXPIRES))
    );
    let out = wrap_region("write-expires", &inner, "", &input.env.text("expires"));
    Ok(ui(input, "expires", &out))
}
