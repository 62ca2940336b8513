//! Integration tests for template composition across fragments

use std::sync::Arc;

use facelet_compose::el::{Beans, DefaultEvaluator};
use facelet_compose::tag::{CompositionHandler, FaceletHandler};
use facelet_compose::view::{FaceletContext, FragmentLibrary};
use facelet_compose::{Component, FaceletError, MemoryLoader, ProjectStage, ViewConfig, ViewEngine};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn loader(pages: &[(&str, &str)]) -> MemoryLoader {
    pages
        .iter()
        .fold(MemoryLoader::new(), |loader, (path, source)| loader.with(*path, *source))
}

fn beans(value: Value) -> Beans {
    match value {
        Value::Object(map) => map,
        _ => Beans::new(),
    }
}

fn build_with(pages: &[(&str, &str)], config: ViewConfig, vars: Value) -> Result<String, FaceletError> {
    let engine = ViewEngine::new(loader(pages), config);
    engine
        .build_view("/page.view", &beans(vars))
        .map(|view| view.to_markup())
}

fn build(pages: &[(&str, &str)]) -> String {
    build_with(pages, ViewConfig::default(), json!({})).expect("view should build")
}

// ============================================
// Slot resolution
// ============================================

#[test]
fn test_composition_fills_named_slots() {
    let markup = build(&[
        (
            "/page.view",
            r##"ui:composition[template: "/layout.view"] {
                ui:define[name: "title"] { "Home" }
                ui:define[name: "body"] { p { "Welcome" } }
            }"##,
        ),
        (
            "/layout.view",
            r##"html {
                head { title { ui:insert[name: "title"] } }
                body { ui:insert[name: "body"] }
            }"##,
        ),
    ]);
    insta::assert_snapshot!(markup, @"<html><head><title>Home</title></head><body><p>Welcome</p></body></html>");
}

#[test]
fn test_unmatched_slot_renders_template_default() {
    let markup = build(&[
        (
            "/page.view",
            r##"ui:composition[template: "/layout.view"] {
                ui:define[name: "header"] { "H2" }
            }"##,
        ),
        (
            "/layout.view",
            r##"header { ui:insert[name: "header"] { "H" } }
                footer { ui:insert[name: "footer"] { "F" } }"##,
        ),
    ]);
    assert_eq!(markup, "<header>H2</header><footer>F</footer>");
}

#[test]
fn test_outer_composition_slots_visible_to_nested_composition() {
    let pages = [
        (
            "/outer.view",
            r##"section { ui:include[src: "/inner-page.view"] }"##,
        ),
        (
            "/inner-page.view",
            r##"ui:composition[template: "/inner.view"] {
                ui:define[name: "y"] { "from B" }
            }"##,
        ),
        (
            "/inner.view",
            r##"p { ui:insert[name: "x"] { "default x" } }
                p { ui:insert[name: "y"] }"##,
        ),
    ];

    let mut composed = pages.to_vec();
    composed.push((
        "/page.view",
        r##"ui:composition[template: "/outer.view"] {
            ui:define[name: "x"] { "from A" }
        }"##,
    ));
    assert_eq!(build(&composed), "<section><p>from A</p><p>from B</p></section>");
}

#[test]
fn test_decorate_hides_outer_definitions() {
    let pages = [
        (
            "/page.view",
            r##"ui:decorate[template: "/outer.view"] {
                ui:define[name: "x"] { "from A" }
            }"##,
        ),
        (
            "/outer.view",
            r##"section { ui:include[src: "/inner-page.view"] }"##,
        ),
        (
            "/inner-page.view",
            r##"ui:decorate[template: "/inner.view"] {
                ui:define[name: "y"] { "from B" }
            }"##,
        ),
        (
            "/inner.view",
            r##"p { ui:insert[name: "x"] { "default x" } }
                p { ui:insert[name: "y"] }"##,
        ),
    ];
    assert_eq!(build(&pages), "<section><p>default x</p><p>from B</p></section>");
}

#[test]
fn test_nested_decorations_bind_to_their_own_definitions() {
    let markup = build(&[
        (
            "/box.view",
            r##"div[class: "box"] { ui:insert[name: "slot"] { "empty" } }"##,
        ),
        (
            "/page.view",
            r##"ui:decorate[template: "/box.view"] {
                ui:define[name: "slot"] {
                    "one"
                    ui:decorate[template: "/box.view"] {
                        ui:define[name: "slot"] {
                            "two"
                            ui:decorate[template: "/box.view"] {
                                ui:define[name: "slot"] { "three" }
                            }
                        }
                    }
                }
            }"##,
        ),
    ]);
    insta::assert_snapshot!(markup, @r#"<div class="box">one<div class="box">two<div class="box">three</div></div></div>"#);
}

#[test]
fn test_definition_can_reinsert_template_default() {
    let markup = build(&[
        (
            "/page.view",
            r##"ui:composition[template: "/layout.view"] {
                ui:define[name: "title"] { ui:insert[name: "title"] " - Settings" }
            }"##,
        ),
        (
            "/layout.view",
            r##"title { ui:insert[name: "title"] { "Site" } }"##,
        ),
    ]);
    assert_eq!(markup, "<title>Site - Settings</title>");
}

#[test]
fn test_unnamed_insert_renders_client_body() {
    let markup = build(&[
        (
            "/page.view",
            r##"ui:composition[template: "/list.view"] {
                li { "a" }
                li { "b" }
            }"##,
        ),
        ("/list.view", r##"ul { ui:insert }"##),
    ]);
    assert_eq!(markup, "<ul><li>a</li><li>b</li></ul>");
}

#[test]
fn test_unnamed_insert_without_client_renders_own_body() {
    let markup = build(&[(
        "/page.view",
        r##"ul { ui:insert { li { "default" } } }"##,
    )]);
    assert_eq!(markup, "<ul><li>default</li></ul>");
}

#[test]
fn test_missing_slot_renders_nothing() {
    let markup = build(&[
        (
            "/page.view",
            r##"ui:composition[template: "/layout.view"] { ui:define[name: "a"] { "A" } }"##,
        ),
        ("/layout.view", r##"div { ui:insert[name: "b"] }"##),
    ]);
    assert_eq!(markup, "<div/>");
}

// ============================================
// Pass-through and trimming
// ============================================

#[test]
fn test_composition_without_template_is_pass_through() {
    let source = r##"div {
        ui:composition {
            "inside"
            ui:define[name: "x"] { "hidden" }
        }
    }"##;
    let config = ViewConfig::new().with_trim_outside_composition(false);
    let markup = build_with(&[("/page.view", source)], config, json!({})).unwrap();
    assert_eq!(markup, "<div>inside</div>");

    let library = FragmentLibrary::new(
        MemoryLoader::new().with("/page.view", source),
        ViewConfig::default(),
    );
    let fragment = library.fragment("/page.view").unwrap();
    let composition = fragment
        .root()
        .as_any()
        .downcast_ref::<CompositionHandler>()
        .expect("trimmed to the composition");
    assert!(composition.is_pass_through());
    assert!(composition.registry().is_absent());
}

#[test]
fn test_content_outside_composition_is_trimmed() {
    let markup = build(&[
        (
            "/page.view",
            r##"html {
                "discarded"
                ui:composition[template: "/layout.view"] { ui:define[name: "a"] { "A" } }
            }"##,
        ),
        ("/layout.view", r##"main { ui:insert[name: "a"] }"##),
    ]);
    assert_eq!(markup, "<main>A</main>");
}

#[test]
fn test_decorate_keeps_surrounding_content() {
    let markup = build(&[
        (
            "/page.view",
            r##"body {
                "before"
                ui:decorate[template: "/frame.view"] { ui:define[name: "a"] { "A" } }
                "after"
            }"##,
        ),
        ("/frame.view", r##"div { ui:insert[name: "a"] }"##),
    ]);
    assert_eq!(markup, "<body>before<div>A</div>after</body>");
}

// ============================================
// Parameters
// ============================================

#[test]
fn test_composition_params_published_before_template() {
    let pages = [
        (
            "/page.view",
            r##"ui:composition[template: "/t.view"] {
                ui:param[name: "user", value: "#{bean.user}"]
                ui:define[name: "body"] { "Welcome #{user}" }
            }"##,
        ),
        ("/t.view", r##"main { h1 { "#{user}" } ui:insert[name: "body"] }"##),
    ];
    let vars = json!({ "bean": { "user": "ada" } });

    let markup = build_with(&pages, ViewConfig::default(), vars.clone()).unwrap();
    assert_eq!(markup, "<main><h1>ada</h1>Welcome ada</main>");

    let library = FragmentLibrary::new(loader(&pages), ViewConfig::default());
    let config = ViewConfig::default();
    let mut ctx = FaceletContext::new(&DefaultEvaluator, &library, &config).with_beans(beans(vars));
    let mut root = Component::root();
    ctx.include_fragment(&mut root, "/page.view").unwrap();

    let published = ctx
        .published_parameters("/page.view:0")
        .expect("parameters published under the tag's unique id");
    assert_eq!(published.names().collect::<Vec<_>>(), vec!["user"]);
    assert_eq!(ctx.variable("user").unwrap(), None);
}

#[test]
fn test_decorate_params_do_not_leak() {
    let pages = [
        (
            "/page.view",
            r##"div {
                ui:decorate[template: "/t.view"] { ui:param[name: "who", value: "inner"] }
                span { "#{who}" }
            }"##,
        ),
        ("/t.view", r##"p { "#{who}" }"##),
    ];

    assert_eq!(build(&pages), "<div><p>inner</p><span/></div>");

    let markup = build_with(&pages, ViewConfig::default(), json!({ "who": "bean" })).unwrap();
    assert_eq!(markup, "<div><p>inner</p><span>bean</span></div>");
}

#[test]
fn test_param_value_refers_to_outer_binding() {
    let markup = build_with(
        &[
            (
                "/page.view",
                r##"ui:decorate[template: "/t.view"] { ui:param[name: "x", value: "#{x}!"] }"##,
            ),
            ("/t.view", r##"b { "#{x}" }"##),
        ],
        ViewConfig::default(),
        json!({ "x": "a" }),
    )
    .unwrap();
    assert_eq!(markup, "<b>a!</b>");
}

#[test]
fn test_include_params_scoped_to_include() {
    let markup = build_with(
        &[
            (
                "/page.view",
                r##"div {
                    ui:include[src: "/card.view"] { ui:param[name: "title", value: "Hi"] }
                    "#{title}"
                }"##,
            ),
            ("/card.view", r##"h3 { "#{title}" }"##),
        ],
        ViewConfig::default(),
        json!({}),
    )
    .unwrap();
    assert_eq!(markup, "<div><h3>Hi</h3></div>");
}

// ============================================
// Include
// ============================================

#[test]
fn test_include_resolves_relative_paths() {
    let engine = ViewEngine::new(
        loader(&[
            ("/pages/home.view", r##"nav { ui:include[src: "parts/menu.view"] }"##),
            ("/pages/parts/menu.view", r##"ul { ui:include[src: "../../shared/item.view"] }"##),
            ("/shared/item.view", r##"li { "home" }"##),
        ]),
        ViewConfig::default(),
    );
    let view = engine.build_view("/pages/home.view", &Beans::new()).unwrap();
    assert_eq!(view.to_markup(), "<nav><ul><li>home</li></ul></nav>");
}

#[test]
fn test_include_with_empty_src_renders_nothing() {
    let markup = build(&[("/page.view", r##"div { ui:include[src: "#{missing}"] }"##)]);
    assert_eq!(markup, "<div/>");
}

#[test]
fn test_error_sentinel_in_development() {
    let pages = [(
        "/page.view",
        r##"ui:include[src: "jakarta.faces.error.xhtml"]"##,
    )];

    let development = ViewConfig::new().with_project_stage(ProjectStage::Development);
    let markup = build_with(&pages, development, json!({})).unwrap();
    insta::assert_snapshot!(markup, @r#"<div class="facelet-dev-error"><h2>An error occurred while building this view</h2><p>Check the server log for details.</p></div>"#);

    let err = build_with(&pages, ViewConfig::default(), json!({})).unwrap_err();
    assert!(matches!(
        err,
        FaceletError::ResourceNotFound { ref path } if path == "/jakarta.faces.error.xhtml"
    ));
}

#[test]
fn test_include_cycle_is_reported() {
    let err = build_with(
        &[
            ("/page.view", r##"ui:include[src: "/a.view"]"##),
            ("/a.view", r##"div { ui:include[src: "/b.view"] }"##),
            ("/b.view", r##"div { ui:include[src: "/a.view"] }"##),
        ],
        ViewConfig::default(),
        json!({}),
    )
    .unwrap_err();

    match err {
        FaceletError::IncludeCycle { chain } => {
            assert_eq!(chain, vec!["/page.view", "/a.view", "/b.view", "/a.view"]);
        }
        other => panic!("expected include cycle, got {other}"),
    }
}

#[test]
fn test_definition_including_its_template_is_a_cycle() {
    let err = build_with(
        &[
            (
                "/page.view",
                r##"ui:composition[template: "/t.view"] {
                    ui:define[name: "x"] { ui:include[src: "/t.view"] }
                }"##,
            ),
            ("/t.view", r##"div { ui:insert[name: "x"] }"##),
        ],
        ViewConfig::default(),
        json!({}),
    )
    .unwrap_err();

    match err {
        FaceletError::IncludeCycle { chain } => {
            assert_eq!(chain, vec!["/page.view", "/t.view", "/page.view"]);
        }
        other => panic!("expected include cycle, got {other}"),
    }
}

// ============================================
// Failures and cleanup
// ============================================

#[test]
fn test_state_restored_after_failed_template() {
    let pages = [
        (
            "/page.view",
            r##"div {
                ui:decorate[template: "/frame.view"] {
                    ui:param[name: "p", value: "v"]
                    ui:define[name: "a"] { "A" }
                }
            }"##,
        ),
        ("/frame.view", r##"div { ui:insert[name: "a"] ui:include[src: "/gone.view"] }"##),
    ];
    let library = FragmentLibrary::new(loader(&pages), ViewConfig::default());
    let config = ViewConfig::default();
    let mut ctx = FaceletContext::new(&DefaultEvaluator, &library, &config);
    let scope_before = ctx.scope().clone();

    let mut root = Component::root();
    let err = ctx.include_fragment(&mut root, "/page.view").unwrap_err();

    assert!(matches!(err, FaceletError::ResourceNotFound { ref path } if path == "/gone.view"));
    assert!(ctx.template_clients().is_empty());
    assert!(Arc::ptr_eq(ctx.scope(), &scope_before));
    assert!(ctx.current_fragment().is_none());
    assert_eq!(ctx.variable("p").unwrap(), None);
}

#[test]
fn test_state_restored_after_failed_composition() {
    let pages = [
        (
            "/page.view",
            r##"ui:composition[template: "/frame.view"] {
                ui:param[name: "p", value: "v"]
                ui:define[name: "a"] { "A" }
            }"##,
        ),
        ("/frame.view", r##"div { ui:insert[name: "a"] ui:include[src: "/gone.view"] }"##),
    ];
    let library = FragmentLibrary::new(loader(&pages), ViewConfig::default());
    let config = ViewConfig::default();
    let mut ctx = FaceletContext::new(&DefaultEvaluator, &library, &config);
    let scope_before = ctx.scope().clone();

    let mut root = Component::root();
    let err = ctx.include_fragment(&mut root, "/page.view").unwrap_err();

    assert!(matches!(err, FaceletError::ResourceNotFound { ref path } if path == "/gone.view"));
    assert!(ctx.template_clients().is_empty());
    assert_eq!(ctx.parameter_depth(), 0);
    assert!(Arc::ptr_eq(ctx.scope(), &scope_before));
    assert!(ctx.current_fragment().is_none());
    assert_eq!(ctx.variable("p").unwrap(), None);
}

#[test]
fn test_cycle_through_definition_leaves_context_clean() {
    let pages = [
        (
            "/page.view",
            r##"ui:composition[template: "/t.view"] {
                ui:param[name: "p", value: "v"]
                ui:define[name: "x"] { ui:include[src: "/t.view"] }
            }"##,
        ),
        ("/t.view", r##"div { ui:insert[name: "x"] }"##),
    ];
    let library = FragmentLibrary::new(loader(&pages), ViewConfig::default());
    let config = ViewConfig::default();
    let mut ctx = FaceletContext::new(&DefaultEvaluator, &library, &config);

    let mut root = Component::root();
    let err = ctx.include_fragment(&mut root, "/page.view").unwrap_err();

    assert!(matches!(err, FaceletError::IncludeCycle { .. }));
    assert!(ctx.template_clients().is_empty());
    assert_eq!(ctx.parameter_depth(), 0);
    assert!(ctx.current_fragment().is_none());
}

#[test]
fn test_missing_template_propagates() {
    let err = build_with(
        &[(
            "/page.view",
            r##"ui:composition[template: "/nope.view"] { ui:define[name: "a"] { "A" } }"##,
        )],
        ViewConfig::default(),
        json!({}),
    )
    .unwrap_err();
    assert!(matches!(err, FaceletError::ResourceNotFound { ref path } if path == "/nope.view"));

    let pages = [(
        "/page.view",
        r##"ui:composition[template: "/nope.view"] { ui:param[name: "p", value: "v"] }"##,
    )];
    let library = FragmentLibrary::new(loader(&pages), ViewConfig::default());
    let config = ViewConfig::default();
    let mut ctx = FaceletContext::new(&DefaultEvaluator, &library, &config);
    let mut root = Component::root();
    assert!(ctx.include_fragment(&mut root, "/page.view").is_err());
    assert!(ctx.template_clients().is_empty());
    assert_eq!(ctx.parameter_depth(), 0);
}

#[test]
fn test_expression_failure_propagates() {
    let err = build_with(
        &[("/page.view", r##"p { "#{title.size}" }"##)],
        ViewConfig::default(),
        json!({ "title": "text" }),
    )
    .unwrap_err();
    assert!(matches!(err, FaceletError::Expression(_)));
}
