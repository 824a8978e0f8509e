//! The full-page layout of the editor.

use super::regions::wrap_region;
use crate::core::{names, ArticleStatus, Message, Privilege, Step};
use crate::errors::WriteDeskError;
use crate::guard::may_edit_as;
use crate::partials::{DocumentLayout, RenderEnv, RenderedRegions, View, ViewState};
use crate::security::form_token;
use crate::utils::html::{graf, hidden_input, href, label, select, tag, void_tag};
use crate::utils::escape_html;

/// Lays the rendered regions out as the editor page.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditorLayout;

fn submit(name: &str, value: &str) -> String {
    void_tag(
        "input",
        &[
            ("type", "submit"),
            ("name", name),
            ("value", value),
            ("class", "publish"),
        ],
    )
}

fn code_block(html: &str, class: &str) -> String {
    let shown = escape_html(html)
        .replace('\n', "<br />")
        .replace('\t', "&#160;&#160;&#160;&#160;");
    tag("code", &shown, &[("class", class)])
}

impl EditorLayout {
    fn hidden_inputs(rendered: &RenderedRegions, state: &ViewState, env: &RenderEnv<'_>) -> String {
        let step = state.step.unwrap_or(Step::Create);
        let mut out = String::new();
        if let Some(draft) = &state.draft {
            out.push_str(&hidden_input(names::STORE, draft));
        }
        for (name, value) in [
            (names::ID, state.get(names::ID)),
            ("event", "article"),
            (names::STEP, step.as_str()),
            (names::S_POSTED, rendered.get(names::S_POSTED)),
            (names::S_LAST_MOD, rendered.get(names::S_LAST_MOD)),
            (names::AUTHOR_ID, state.get(names::AUTHOR_ID)),
            (names::LAST_MOD_ID, state.get(names::LAST_MOD_ID)),
            (names::VIEW, ""),
        ] {
            out.push_str(&hidden_input(name, value));
        }
        out.push_str(&hidden_input(
            names::TOKEN,
            &form_token(&env.principal.nonce, &env.prefs.blog_uid),
        ));
        out
    }

    fn configuration_column(rendered: &RenderedRegions, state: &ViewState, env: &RenderEnv<'_>) -> String {
        if state.view != View::Text {
            return "&#160;".to_string();
        }
        let mut out = String::from(rendered.get("sidehelp"));
        out.push_str(&env.pluggable_ui("extend_col_1", "", state));

        let filters = env.filters.options();
        let markup = format!(
            "{}{}",
            graf(
                &format!(
                    "{}<br />{}",
                    label(&env.text("article_markup"), "markup-body"),
                    select(names::BODY_FILTER, &filters, state.get(names::BODY_FILTER), false, "markup-body")
                ),
                "markup markup-body",
            ),
            graf(
                &format!(
                    "{}<br />{}",
                    label(&env.text("excerpt_markup"), "markup-excerpt"),
                    select(
                        names::EXCERPT_FILTER,
                        &filters,
                        state.get(names::EXCERPT_FILTER),
                        false,
                        "markup-excerpt"
                    )
                ),
                "markup markup-excerpt",
            )
        );
        let mut advanced = env.pluggable_ui("markup", &markup, state);
        if env.prefs.allow_form_override {
            let forms: Vec<(String, String)> = env
                .catalog
                .article_forms
                .iter()
                .map(|f| (f.clone(), f.clone()))
                .collect();
            let override_form = graf(
                &format!(
                    "{}<br />{}",
                    label(&env.text("override_default_form"), "override-form"),
                    select(
                        names::OVERRIDE_FORM,
                        &forms,
                        state.get(names::OVERRIDE_FORM),
                        true,
                        "override-form"
                    )
                ),
                "override-form",
            );
            advanced.push_str(&env.pluggable_ui("override", &override_form, state));
        }
        out.push_str(&wrap_region(
            "advanced_group",
            &advanced,
            "advanced",
            &env.text("advanced_options"),
        ));

        out.push_str(rendered.get("custom_fields"));
        out.push_str(rendered.get("image"));
        out.push_str(&wrap_region(
            "meta_group",
            &format!("{}{}", rendered.get("keywords"), rendered.get("url_title")),
            "meta",
            &env.text("meta"),
        ));
        out.push_str(&wrap_region(
            "recent_group",
            rendered.get("recent_articles"),
            "recent",
            &env.text("recent_articles"),
        ));
        out
    }

    fn main_column(rendered: &RenderedRegions, state: &ViewState, env: &RenderEnv<'_>) -> String {
        let title = escape_html(state.get(names::TITLE));
        let use_excerpts = env.prefs.articles_use_excerpts;
        let mut out = match state.view {
            View::Preview => {
                let mut out = format!(
                    "{}{}{}",
                    tag("h2", &escape_html(&env.text("preview")), &[]),
                    tag("h1", &title, &[("class", "title")]),
                    tag("div", &state.body_html, &[("class", "body")])
                );
                if use_excerpts {
                    out.push_str("<hr />");
                    out.push_str(&tag("div", &state.excerpt_html, &[("class", "excerpt")]));
                }
                tag("div", &out, &[("class", "preview")])
            }
            View::Html => {
                let mut out = format!(
                    "{}{}{}",
                    tag("h2", "HTML", &[]),
                    tag("h1", &title, &[("class", "title")]),
                    code_block(&state.body_html, "body")
                );
                if use_excerpts {
                    out.push_str("<hr />");
                    out.push_str(&code_block(&state.excerpt_html, "excerpt"));
                }
                tag("div", &out, &[("class", "html")])
            }
            View::Text => {
                let mut out = format!("{}{}", rendered.get("title"), rendered.get("body"));
                if use_excerpts {
                    out.push_str(rendered.get("excerpt"));
                }
                if !state.is_create() {
                    out.push_str(rendered.get("author"));
                }
                tag("div", &out, &[("class", "text")])
            }
        };
        out.push_str(&hidden_input(names::FROM_VIEW, state.view.as_str()));
        tag("div", &out, &[("role", "region"), ("id", "main_content")])
    }

    fn push_button(state: &ViewState, env: &RenderEnv<'_>) -> String {
        let principal = env.principal;
        if state.is_create() {
            let label = if principal.has(Privilege::Publish) {
                env.text("publish")
            } else {
                env.text("save")
            };
            return tag("p", &submit(names::PUBLISH, &label), &[("id", "write-publish")]);
        }
        let status = ArticleStatus::from_form(state.get(names::STATUS)).unwrap_or(ArticleStatus::Draft);
        if may_edit_as(principal, status, state.get(names::AUTHOR_ID)) {
            tag("p", &submit(names::SAVE, &env.text("save")), &[("id", "write-save")])
        } else {
            String::new()
        }
    }

    fn supporting_column(rendered: &RenderedRegions, state: &ViewState, env: &RenderEnv<'_>) -> String {
        if state.view != View::Text {
            return String::new();
        }
        let mut out = String::new();
        if !state.is_create() {
            out.push_str(&graf(&href(&env.text("create_new"), "?event=article"), "action-create"));
            if state.prev_id.is_some() || state.next_id.is_some() {
                out.push_str(rendered.get("article_nav"));
            }
        }
        out.push_str(rendered.get("status"));

        let sort = wrap_region(
            "write-sort",
            &format!("{}{}", rendered.get("section"), rendered.get("categories")),
            "",
            &env.text("sort_display"),
        );
        out.push_str(&env.pluggable_ui("sort_display", &sort, state));
        out.push_str(&wrap_region(
            "comments_group",
            rendered.get("comments"),
            "comments",
            &env.text("comment_settings"),
        ));
        out.push_str(&wrap_region(
            "dates_group",
            &format!("{}{}", rendered.get("posted"), rendered.get("expires")),
            "dates",
            &env.text("date_settings"),
        ));
        out.push_str(&Self::push_button(state, env));
        out
    }
}

impl DocumentLayout for EditorLayout {
    fn assemble(
        &self,
        rendered: &RenderedRegions,
        state: &ViewState,
        env: &RenderEnv<'_>,
        message: &Message,
    ) -> Result<String, WriteDeskError> {
        let title = match state.get(names::TITLE) {
            "" => env.text("write"),
            title => title.to_string(),
        };
        let message_pane = if message.is_empty() {
            tag("div", "", &[("id", "messagepane")])
        } else {
            tag(
                "div",
                &tag(
                    "span",
                    &escape_html(&message.text),
                    &[("class", &format!("messageflash {}", message.severity))],
                ),
                &[("id", "messagepane")],
            )
        };

        let columns = format!(
            "{}{}{}{}",
            tag(
                "td",
                &tag(
                    "div",
                    &Self::configuration_column(rendered, state, env),
                    &[("id", "configuration_content")],
                ),
                &[("id", "article-col-1")],
            ),
            tag("td", &Self::main_column(rendered, state, env), &[("id", "article-main")]),
            tag("td", rendered.get("view_modes"), &[("id", "article-tabs")]),
            tag(
                "td",
                &tag(
                    "div",
                    &Self::supporting_column(rendered, state, env),
                    &[("id", "supporting_content")],
                ),
                &[("id", "article-col-2")],
            ),
        );
        let table = tag(
            "table",
            &tag("tr", &columns, &[]),
            &[("class", "txp-columntable")],
        );

        let form_body = format!("{}{table}", Self::hidden_inputs(rendered, state, env));
        let mut form_attrs = vec![
            ("id", "article_form"),
            ("name", "article_form"),
            ("method", "post"),
            ("action", "index.php"),
        ];
        if !state.is_create() {
            form_attrs.push(("class", "async"));
        }
        let form = tag("form", &form_body, &form_attrs);

        let body = format!(
            "{message_pane}{}{}",
            tag("h1", &escape_html(&env.text("write")), &[("class", "txp-heading")]),
            tag("div", &form, &[("id", "article_container"), ("class", "txp-container")]),
        );
        Ok(format!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\" /><title>{}</title></head><body>{body}</body></html>",
            escape_html(&title)
        ))
    }
}
