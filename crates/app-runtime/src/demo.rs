//! Sample application wired on top of the runtime.
//!
//! Three pages (`/`, `/feed`, `/races/:raceId`), two component kinds
//! (`race-card`, `like-button`) and one locator service (`feedService`,
//! which depends on `eventBus`). Used by the `pitwall` binary and by the
//! integration tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use pw_01_service_locator::{BoxError, Resolved, ServiceError, ServiceLocator};
use pw_02_component_factory::{
    interpolate, Component, ComponentError, ComponentFactory, ComponentOptions, FactorySettings,
};
use pw_03_router::{
    PageError, PageModule, Query, QueryValue, RouteDefinition, RouteParams, StaticModuleLoader,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared_bus::{EventBus, EventMetadata, EventPublisher};
use shared_types::{Markup, MountSpec, Target};
use tracing::debug;

use crate::config::RuntimeConfig;
use crate::container::{RuntimeBuilder, RuntimeContext, RuntimeError, EVENT_BUS_SERVICE};

pub const FEED_SERVICE: &str = "feedService";
pub const POST_LIKED: &str = "post.liked";

pub const RACE_CARD: &str = "race-card";
pub const LIKE_BUTTON: &str = "like-button";

const RACE_CARD_TEMPLATE: &str =
    "<article class=\"race\">{{race.name}} @ {{race.circuit}}</article>";

/// Routes of the sample app.
#[must_use]
pub fn demo_routes() -> Vec<RouteDefinition> {
    vec![
        RouteDefinition::new("/", "home").named("home"),
        RouteDefinition::new("/feed", "feed").named("feed"),
        RouteDefinition::new("/races/:raceId", "race").named("race"),
    ]
}

/// Build a runtime with the sample pages, components and services.
pub fn build_demo_runtime(config: RuntimeConfig) -> Result<RuntimeContext, RuntimeError> {
    let services = Arc::new(ServiceLocator::new());
    register_demo_services(&services)?;

    let settings = FactorySettings::from(&config.components);
    let loader = demo_loader(Arc::clone(&services), settings);
    let ctx = RuntimeBuilder::new()
        .with_config(config)
        .with_services(services)
        .with_loader(loader)
        .with_routes(demo_routes())
        .build()?;
    register_demo_components(ctx.components())?;
    Ok(ctx)
}

// =============================================================================
// Services
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub author: String,
    pub body: String,
    pub tag: String,
    pub likes: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedConfig {
    page_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

/// In-memory social feed that announces likes on the bus.
pub struct FeedService {
    bus: Arc<EventBus>,
    posts: RwLock<Vec<Post>>,
    page_size: usize,
}

impl FeedService {
    fn new(bus: Arc<EventBus>, page_size: usize) -> Self {
        let posts = [
            (1, "lena", "Pole lap at Spa was unreal", "f1"),
            (2, "marco", "Wet Le Mans stint, 3am, still smiling", "endurance"),
            (3, "sam", "Monaco qualifying thread", "f1"),
        ]
        .into_iter()
        .map(|(id, author, body, tag)| Post {
            id,
            author: author.to_string(),
            body: body.to_string(),
            tag: tag.to_string(),
            likes: 0,
        })
        .collect();
        Self {
            bus,
            posts: RwLock::new(posts),
            page_size,
        }
    }

    /// Most recent posts, optionally only those tagged `tag`.
    #[must_use]
    pub fn posts(&self, tag: Option<&str>) -> Vec<Post> {
        self.posts
            .read()
            .iter()
            .rev()
            .filter(|post| tag.map_or(true, |tag| post.tag == tag))
            .take(self.page_size)
            .cloned()
            .collect()
    }

    /// Add a like and publish `post.liked`. Returns the new count.
    pub async fn like(&self, post_id: u64) -> Option<u64> {
        let likes = {
            let mut posts = self.posts.write();
            let post = posts.iter_mut().find(|post| post.id == post_id)?;
            post.likes += 1;
            post.likes
        };
        self.bus
            .emit(
                POST_LIKED,
                json!({ "postId": post_id, "likes": likes }),
                EventMetadata::new().source(FEED_SERVICE),
            )
            .await;
        Some(likes)
    }
}

pub fn register_demo_services(services: &ServiceLocator) -> Result<(), ServiceError> {
    services.register_singleton(FEED_SERVICE, &[EVENT_BUS_SERVICE], |resolved: &Resolved| {
        let bus = resolved.get::<EventBus>(EVENT_BUS_SERVICE)?;
        let config: FeedConfig = resolved.config_as::<FeedConfig>()?.unwrap_or_default();
        Ok::<_, BoxError>(FeedService::new(bus, config.page_size))
    })
}

// =============================================================================
// Components
// =============================================================================

/// Card summarising one race, rendered from the `race-card` template.
struct RaceCard {
    target: Target,
    options: Value,
}

impl Component for RaceCard {
    fn render(&self) {
        self.target
            .render(Markup::new(interpolate(RACE_CARD_TEMPLATE, &self.options)));
    }

    fn destroy(&self) {
        self.target.render(Markup::default());
    }
}

/// Like counter for one post. Follows `likes.<postId>` in app state.
struct LikeButton {
    target: Target,
    post_id: u64,
    likes: AtomicU64,
}

impl LikeButton {
    fn draw(&self) {
        let likes = self.likes.load(Ordering::Relaxed);
        self.target
            .render(Markup::new(format!("<button>♥ {likes}</button>")));
    }
}

impl Component for LikeButton {
    fn render(&self) {
        self.draw();
    }

    fn destroy(&self) {
        self.target.render(Markup::default());
    }

    fn on_state_change(&self, new_state: &Value, _old_state: &Value) {
        let key = self.post_id.to_string();
        if let Some(likes) = new_state
            .get("likes")
            .and_then(|likes| likes.get(&key))
            .and_then(Value::as_u64)
        {
            self.likes.store(likes, Ordering::Relaxed);
            self.draw();
        }
    }
}

pub fn register_demo_components(factory: &ComponentFactory) -> Result<(), ComponentError> {
    factory.register(
        RACE_CARD,
        |target: Target, options: ComponentOptions| {
            Ok::<_, ComponentError>(RaceCard {
                target,
                options: Value::Object(options),
            })
        },
        json!({ "race": { "name": "TBA", "circuit": "TBA" } }),
    )?;
    factory.register(
        LIKE_BUTTON,
        |target: Target, options: ComponentOptions| {
            let post_id = options
                .get("postId")
                .and_then(Value::as_u64)
                .ok_or_else(|| ComponentError::construction(LIKE_BUTTON, "missing postId"))?;
            let likes = options.get("likes").and_then(Value::as_u64).unwrap_or(0);
            Ok(LikeButton {
                target,
                post_id,
                likes: AtomicU64::new(likes),
            })
        },
        json!({ "likes": 0 }),
    )
}

// =============================================================================
// Pages
// =============================================================================

/// Loader holding the three sample pages. The feed page is built lazily.
#[must_use]
pub fn demo_loader(
    services: Arc<ServiceLocator>,
    settings: FactorySettings,
) -> Arc<StaticModuleLoader> {
    let loader = Arc::new(StaticModuleLoader::new());
    loader.register("home", Arc::new(HomePage));
    loader.register(
        "race",
        Arc::new(RacePage {
            settings: settings.clone(),
        }),
    );
    loader.register_lazy("feed", move || {
        debug!("Building feed page");
        Ok(Arc::new(FeedPage {
            services: Arc::clone(&services),
            settings: settings.clone(),
        }) as Arc<dyn PageModule>)
    });
    loader
}

fn component_mount(
    settings: &FactorySettings,
    id: String,
    kind: &str,
    options: &Value,
) -> MountSpec {
    MountSpec::new(id)
        .attr(settings.marker_attribute.as_str(), kind)
        .attr(settings.options_attribute.as_str(), options.to_string())
}

struct HomePage;

#[async_trait]
impl PageModule for HomePage {
    async fn render(&self, _params: &RouteParams, _query: &Query) -> Result<Markup, PageError> {
        Ok(Markup::new(
            "<h1>Pitwall</h1><nav><a href=\"/feed\">Feed</a> <a href=\"/races/spa\">Spa</a></nav>",
        ))
    }
}

struct FeedPage {
    services: Arc<ServiceLocator>,
    settings: FactorySettings,
}

#[async_trait]
impl PageModule for FeedPage {
    async fn render(&self, _params: &RouteParams, query: &Query) -> Result<Markup, PageError> {
        let feed: Arc<FeedService> = self
            .services
            .get(FEED_SERVICE)
            .map_err(|e| PageError::Render(e.to_string()))?;
        let tag = query.get("tag").and_then(QueryValue::as_str);
        let posts = feed.posts(tag);

        let mut html = String::from("<h1>Feed</h1>");
        if posts.is_empty() {
            html.push_str("<p>No posts yet</p>");
        }
        let mut markup = Markup::default();
        for post in &posts {
            html.push_str(&format!("<p>{}: {}</p>", post.author, post.body));
            markup = markup.with_mount(component_mount(
                &self.settings,
                format!("like-{}", post.id),
                LIKE_BUTTON,
                &json!({ "postId": post.id, "likes": post.likes }),
            ));
        }
        markup.html = html;
        Ok(markup)
    }
}

struct RacePage {
    settings: FactorySettings,
}

fn race_info(race_id: &str) -> Option<Value> {
    let (name, circuit) = match race_id {
        "spa" => ("Belgian Grand Prix", "Spa-Francorchamps"),
        "monaco" => ("Monaco Grand Prix", "Circuit de Monaco"),
        "lemans" => ("24 Hours of Le Mans", "Circuit de la Sarthe"),
        _ => return None,
    };
    Some(json!({ "name": name, "circuit": circuit }))
}

#[async_trait]
impl PageModule for RacePage {
    async fn render(&self, params: &RouteParams, _query: &Query) -> Result<Markup, PageError> {
        let race_id = params
            .get("raceId")
            .ok_or_else(|| PageError::Render("missing raceId".into()))?;
        let race = race_info(race_id)
            .ok_or_else(|| PageError::Render(format!("unknown race `{race_id}`")))?;

        Ok(Markup::new(format!("<h1>Race: {race_id}</h1>")).with_mount(component_mount(
            &self.settings,
            format!("race-card-{race_id}"),
            RACE_CARD,
            &json!({ "race": race }),
        )))
    }
}
