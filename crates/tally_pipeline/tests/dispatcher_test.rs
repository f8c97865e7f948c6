use async_trait::async_trait;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use tally_core::{AccountBuilder, NormalizedEvent, NormalizedEventBuilder};
use tally_error::ActionResult;
use tally_interface::{Action, MatchResult};
use tally_pipeline::{ActionScheduler, EventDispatcher};

type Log = Arc<Mutex<Vec<String>>>;

struct TestRule {
    name: String,
    pattern: Option<Regex>,
    tags: BTreeSet<String>,
    log: Log,
}

impl TestRule {
    fn text(name: &str, pattern: &str, log: &Log) -> Arc<dyn Action> {
        Arc::new(Self {
            name: name.to_string(),
            pattern: Some(Regex::new(pattern).unwrap()),
            tags: BTreeSet::new(),
            log: log.clone(),
        })
    }

    fn tag(name: &str, tag: &str, log: &Log) -> Arc<dyn Action> {
        Arc::new(Self {
            name: name.to_string(),
            pattern: None,
            tags: [tag.to_string()].into(),
            log: log.clone(),
        })
    }
}

#[async_trait]
impl Action for TestRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn predicate(&self, event: &NormalizedEvent) -> Option<MatchResult> {
        if let Some(found) = self.pattern.as_ref().and_then(|p| p.find(event.text())) {
            return Some(MatchResult::Text {
                offset: found.start(),
            });
        }
        if !self.tags.is_disjoint(event.tags()) {
            return Some(MatchResult::Tag);
        }
        None
    }

    async fn invoke(&self, _event: Arc<NormalizedEvent>) -> ActionResult<()> {
        self.log.lock().unwrap().push(self.name.clone());
        Ok(())
    }
}

fn event(text: &str, tags: &[&str]) -> NormalizedEvent {
    NormalizedEventBuilder::default()
        .id("1")
        .account(AccountBuilder::default().id("9").acct("bob").build().unwrap())
        .text(text)
        .tags(tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>())
        .build()
        .unwrap()
}

fn names(dispatcher: &EventDispatcher, event: NormalizedEvent) -> Vec<String> {
    dispatcher
        .plan(&Arc::new(event))
        .iter()
        .map(|c| c.rule.name().to_string())
        .collect()
}

#[tokio::test]
async fn test_earlier_offset_runs_first() {
    let log: Log = Arc::default();
    let scheduler = Arc::new(ActionScheduler::default());
    let dispatcher = EventDispatcher::new(
        vec![
            TestRule::text("twenty", "twenty", &log),
            TestRule::text("five", "five", &log),
        ],
        scheduler.clone(),
    );
    let text = "xxxxxfive xxxxxxxxxxtwenty";

    let plan = dispatcher.plan(&Arc::new(event(text, &[])));
    assert_eq!(plan[0].match_offset, Some(5));
    assert_eq!(plan[1].match_offset, Some(20));

    assert_eq!(dispatcher.dispatch(event(text, &[])), 2);
    scheduler.shutdown().await;
    assert_eq!(*log.lock().unwrap(), vec!["five", "twenty"]);
}

#[tokio::test]
async fn test_tag_matches_follow_text_matches() {
    let log: Log = Arc::default();
    let dispatcher = EventDispatcher::new(
        vec![
            TestRule::tag("by-tag", "tally", &log),
            TestRule::text("late-text", "end$", &log),
        ],
        Arc::new(ActionScheduler::default()),
    );

    let plan = dispatcher.plan(&Arc::new(event("all the way to the end", &["tally"])));

    assert_eq!(plan.len(), 2);
    assert_eq!(plan[0].rule.name(), "late-text");
    assert!(!plan[0].is_emoji_match);
    assert_eq!(plan[1].rule.name(), "by-tag");
    assert!(plan[1].is_emoji_match);
    assert_eq!(plan[1].match_offset, None);
}

#[tokio::test]
async fn test_ties_keep_registration_order() {
    let log: Log = Arc::default();
    let dispatcher = EventDispatcher::new(
        vec![
            TestRule::tag("tag-b", "b", &log),
            TestRule::text("word-2", "^hello", &log),
            TestRule::tag("tag-a", "a", &log),
            TestRule::text("word-1", "^hel", &log),
        ],
        Arc::new(ActionScheduler::default()),
    );

    assert_eq!(
        names(&dispatcher, event("hello", &["a", "b"])),
        vec!["word-2", "word-1", "tag-b", "tag-a"]
    );
}

#[tokio::test]
async fn test_plan_contains_exactly_the_matching_rules() {
    let log: Log = Arc::default();
    let dispatcher = EventDispatcher::new(
        vec![
            TestRule::text("counter", "^tally!$", &log),
            TestRule::text("pick", "pick me", &log),
            TestRule::tag("sushi", "sushi", &log),
        ],
        Arc::new(ActionScheduler::default()),
    );

    assert_eq!(
        names(&dispatcher, event("please pick me", &["sushi"])),
        vec!["pick", "sushi"]
    );
    assert_eq!(names(&dispatcher, event("tally!", &[])), vec!["counter"]);
}

#[tokio::test]
async fn test_no_match_schedules_nothing() {
    let log: Log = Arc::default();
    let scheduler = Arc::new(ActionScheduler::default());
    let dispatcher = EventDispatcher::new(
        vec![TestRule::text("pick", "pick me", &log)],
        scheduler.clone(),
    );

    assert_eq!(dispatcher.dispatch(event("nothing to see", &["other"])), 0);
    assert_eq!(scheduler.pending(), 0);
    scheduler.shutdown().await;
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_dispatch_after_shutdown_submits_nothing() {
    let log: Log = Arc::default();
    let scheduler = Arc::new(ActionScheduler::default());
    let dispatcher = EventDispatcher::new(
        vec![TestRule::text("pick", "pick me", &log)],
        scheduler.clone(),
    );
    scheduler.shutdown().await;

    assert_eq!(dispatcher.dispatch(event("pick me", &[])), 0);
}
