//! Tests for the theme engine

use super::*;
use std::fs;
use tempfile::TempDir;
use tera::Context as TeraContext;

/// Helper to create a theme directory with the given templates
fn create_test_theme(themes_dir: &Path, theme_name: &str, templates: &[(&str, &str)]) -> PathBuf {
    let theme_path = themes_dir.join(theme_name);
    fs::create_dir_all(&theme_path).unwrap();
    for (name, content) in templates {
        let path = theme_path.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    theme_path
}

/// Whether the engine has a template registered under `name`
fn has_template(engine: &ThemeEngine, name: &str) -> bool {
    engine.tera.get_template_names().any(|loaded| loaded == name)
}

fn summary(title: &str, slug: &str) -> serde_json::Value {
    serde_json::json!({
        "id": 1,
        "title": title,
        "teaser_text": "Short teaser",
        "author": "alice",
        "image_url": null,
        "published_at": "2024-03-01T10:00:00Z",
        "slug": slug,
        "comments_amount": 2,
        "tags": [{"title": "rust", "posts_with_tag": 3}],
        "first_tag_title": "rust"
    })
}

fn home_context() -> TeraContext {
    let mut ctx = TeraContext::new();
    ctx.insert("page_posts", &vec![summary("Fresh post", "fresh-post")]);
    ctx.insert("most_popular_posts", &vec![summary("Hit post", "hit-post")]);
    ctx.insert(
        "popular_tags",
        &serde_json::json!([{"title": "rust", "posts_with_tag": 3}]),
    );
    ctx
}

#[test]
fn test_missing_theme_dir_uses_builtin_templates() {
    let temp_dir = TempDir::new().unwrap();

    let engine = ThemeEngine::new(&temp_dir.path().join("themes"), "default").unwrap();

    assert_eq!(engine.current_theme(), "default");
    for template in [
        "index.html",
        "post-details.html",
        "posts-list.html",
        "contacts.html",
        NOT_FOUND_TEMPLATE,
        ERROR_TEMPLATE,
    ] {
        assert!(has_template(&engine, template), "missing {}", template);
    }
}

#[test]
fn test_builtin_home_page_renders_posts_and_sidebar() {
    let engine = ThemeEngine::builtin().unwrap();

    let html = engine.render("index.html", &home_context()).unwrap();

    assert!(html.contains("Fresh post"));
    assert!(html.contains("/post/fresh-post"));
    assert!(html.contains("Hit post"));
    assert!(html.contains("/tag/rust"));
    assert!(html.contains("March 01, 2024"));
}

#[test]
fn test_builtin_post_without_tags_or_comments() {
    let engine = ThemeEngine::builtin().unwrap();
    let mut ctx = TeraContext::new();
    ctx.insert(
        "post",
        &serde_json::json!({
            "title": "Lonely",
            "text": "line one\nline two",
            "author": "alice",
            "comments": [],
            "likes_amount": 0,
            "image_url": null,
            "published_at": "2024-03-01T10:00:00Z",
            "slug": "lonely",
            "tags": []
        }),
    );
    ctx.insert("popular_tags", &Vec::<serde_json::Value>::new());
    ctx.insert("most_popular_posts", &Vec::<serde_json::Value>::new());

    let html = engine.render("post-details.html", &ctx).unwrap();

    assert!(html.contains("Lonely"));
    assert!(html.contains("No comments yet."));
    assert!(html.contains("line one<br>line two"));
}

#[test]
fn test_builtin_contacts_renders_with_empty_context() {
    let engine = ThemeEngine::builtin().unwrap();

    let html = engine.render("contacts.html", &TeraContext::new()).unwrap();

    assert!(html.contains("Contacts"));
}

#[test]
fn test_theme_template_overrides_builtin() {
    let temp_dir = TempDir::new().unwrap();
    let themes_path = temp_dir.path().join("themes");
    create_test_theme(
        &themes_path,
        "custom",
        &[("contacts.html", "<p>Write to us at {{ mail | default(value='nobody') }}</p>")],
    );

    let engine = ThemeEngine::new(&themes_path, "custom").unwrap();
    let html = engine.render("contacts.html", &TeraContext::new()).unwrap();

    assert_eq!(html, "<p>Write to us at nobody</p>");
    // Templates the theme lacks keep their built-in version
    assert!(has_template(&engine, "index.html"));
}

#[test]
fn test_theme_child_can_extend_builtin_base() {
    let temp_dir = TempDir::new().unwrap();
    let themes_path = temp_dir.path().join("themes");
    create_test_theme(
        &themes_path,
        "custom",
        &[(
            "contacts.html",
            r#"{% extends "base.html" %}{% block content %}<p>custom contacts</p>{% endblock content %}"#,
        )],
    );

    let engine = ThemeEngine::new(&themes_path, "custom").unwrap();
    let html = engine.render("contacts.html", &TeraContext::new()).unwrap();

    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains("custom contacts"));
}

#[test]
fn test_nested_templates_use_forward_slash_names() {
    let temp_dir = TempDir::new().unwrap();
    let themes_path = temp_dir.path().join("themes");
    create_test_theme(&themes_path, "custom", &[("partials/footer.html", "footer")]);

    let engine = ThemeEngine::new(&themes_path, "custom").unwrap();

    assert!(has_template(&engine, "partials/footer.html"));
}

#[test]
fn test_invalid_theme_template_fails_to_load() {
    let temp_dir = TempDir::new().unwrap();
    let themes_path = temp_dir.path().join("themes");
    create_test_theme(&themes_path, "broken", &[("index.html", "{% if %}")]);

    let result = ThemeEngine::new(&themes_path, "broken");

    assert!(result.is_err());
}

#[test]
fn test_render_missing_template_is_error() {
    let engine = ThemeEngine::builtin().unwrap();

    let err = engine.render("nope.html", &TeraContext::new()).unwrap_err();

    assert!(err.to_string().contains("nope.html"));
}

#[test]
fn test_render_with_fallback_uses_error_template() {
    let engine = ThemeEngine::builtin().unwrap();

    let html = engine.render_with_fallback("nope.html", &TeraContext::new());

    assert!(html.contains("Something went wrong"));
}

#[test]
fn test_render_with_fallback_simple_page_when_error_template_breaks() {
    let temp_dir = TempDir::new().unwrap();
    let themes_path = temp_dir.path().join("themes");
    create_test_theme(
        &themes_path,
        "custom",
        &[(ERROR_TEMPLATE, "{{ undefined_variable.field }}")],
    );
    let engine = ThemeEngine::new(&themes_path, "custom").unwrap();

    let html = engine.render_with_fallback("nope.html", &TeraContext::new());

    assert!(html.contains("<h1>Template Error</h1>"));
    assert!(html.contains("nope.html"));
}

#[test]
fn test_render_not_found_page() {
    let engine = ThemeEngine::builtin().unwrap();

    let html = engine.render_not_found("No post with slug 'x'");

    assert!(html.contains("Page not found"));
    assert!(html.contains("No post with slug &#x27;x&#x27;"));
}

#[test]
fn test_simple_error_page_escapes_message() {
    let html = simple_error_page("Not Found", "<script>alert(1)</script>");

    assert!(html.contains("&lt;script&gt;alert(1)&lt;&#x2F;script&gt;"));
    assert!(!html.contains("<script>"));

    let quoted = simple_error_page("Oops", "it's \"bad\"");
    assert!(quoted.contains("it&#x27;s &quot;bad&quot;"));
}

#[test]
fn test_reload_picks_up_changed_templates() {
    let temp_dir = TempDir::new().unwrap();
    let themes_path = temp_dir.path().join("themes");
    let theme_path = create_test_theme(&themes_path, "custom", &[("contacts.html", "v1")]);
    let mut engine = ThemeEngine::new(&themes_path, "custom").unwrap();

    fs::write(theme_path.join("contacts.html"), "v2").unwrap();
    engine.reload_templates().unwrap();

    assert_eq!(engine.render("contacts.html", &TeraContext::new()).unwrap(), "v2");
}

#[test]
fn test_reload_without_theme_dir_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let mut engine = ThemeEngine::new(temp_dir.path(), "absent").unwrap();

    let err = engine.reload_templates().unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ThemeError>(),
        Some(ThemeError::NotFound(_))
    ));
}
