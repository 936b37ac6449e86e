use super::*;
use kite_core::ViewAttribute;
use kite_testing::{drain, event_log, recording_view_class, RecordingView, EventLog, STYLE, TEXT};

struct Card;
struct Badge;

fn container(log: &EventLog) -> ViewHandle {
    ViewHandle::new(Box::new(RecordingView::new("root", log.clone())))
}

fn view_id(view: &ViewHandle) -> usize {
    view.downcast_with(RecordingView::id).expect("recording view")
}

#[test]
fn views_are_recycled_in_vend_order() {
    let log = event_log();
    let root = container(&log);
    let class = recording_view_class("label", log.clone());
    let mut pool = ViewPool::default();

    let first = pool.view_for(&class, &root);
    let second = pool.view_for(&class, &root);
    pool.reset();
    let again = pool.view_for(&class, &root);

    assert!(!first.ptr_eq(&second));
    assert!(again.ptr_eq(&first));
    assert_eq!(pool.len(), 2);
    let children = root.downcast_with(|view: &RecordingView| view.subviews().to_vec());
    assert_eq!(children, Some(vec![view_id(&first), view_id(&second)]));
}

#[test]
fn reset_hides_unvended_views() {
    let log = event_log();
    let root = container(&log);
    let class = recording_view_class("label", log.clone());
    let mut pool = ViewPool::default();
    let _first = pool.view_for(&class, &root);
    let second = pool.view_for(&class, &root);
    pool.reset();
    drain(&log);

    pool.view_for(&class, &root);
    pool.reset();

    assert_eq!(second.downcast_with(RecordingView::is_hidden), Some(true));
    let id = view_id(&second);
    assert_eq!(
        drain(&log),
        vec![format!("label#{id} hidden=true"), format!("label#{id} enter pool")]
    );

    let shown = {
        pool.view_for(&class, &root);
        pool.view_for(&class, &root)
    };
    assert!(shown.ptr_eq(&second));
    assert_eq!(shown.downcast_with(RecordingView::is_hidden), Some(false));
    assert_eq!(
        drain(&log),
        vec![format!("label#{id} leave pool"), format!("label#{id} hidden=false")]
    );
}

#[test]
fn keys_never_share_views() {
    let log = event_log();
    let root = container(&log);
    let class = recording_view_class("label", log.clone());
    let plain = ViewConfiguration::new(class.clone()).with(TEXT, "a");
    let styled = ViewConfiguration::new(class.clone()).with(STYLE, "bold");
    let mut pools = ViewPoolMap::new();

    let card = pools.view_for(PoolKey::new(ProducerClass::of::<Card>(), &plain), &class, &root);
    let badge = pools.view_for(PoolKey::new(ProducerClass::of::<Badge>(), &plain), &class, &root);
    let styled_card =
        pools.view_for(PoolKey::new(ProducerClass::of::<Card>(), &styled), &class, &root);
    pools.reset();
    let card_again =
        pools.view_for(PoolKey::new(ProducerClass::of::<Card>(), &plain), &class, &root);

    assert!(!card.ptr_eq(&badge));
    assert!(!card.ptr_eq(&styled_card));
    assert!(card_again.ptr_eq(&card));
    assert_eq!(pools.view_count(), 3);
}

#[test]
fn resettable_attributes_do_not_change_the_key() {
    let class = recording_view_class("label", event_log());
    let a = ViewConfiguration::new(class.clone()).with(TEXT, "a");
    let b = ViewConfiguration::new(class).with(TEXT, "b");

    assert_eq!(
        PoolKey::new(ProducerClass::of::<Card>(), &a),
        PoolKey::new(ProducerClass::of::<Card>(), &b)
    );
}

#[test]
fn hide_all_hides_vended_views_too() {
    let log = event_log();
    let root = container(&log);
    let class = recording_view_class("label", log.clone());
    let mut pools = ViewPoolMap::new();
    let key = PoolKey::new(ProducerClass::of::<Card>(), &ViewConfiguration::new(class.clone()));
    let view = pools.view_for(key.clone(), &class, &root);

    pools.hide_all();

    assert_eq!(view.downcast_with(RecordingView::is_hidden), Some(true));
    assert_eq!(pools.pool(&key).map(ViewPool::vended), Some(0));
}

#[test]
fn same_named_classes_keep_separate_pools() {
    let log = event_log();
    let root = container(&log);
    let label = recording_view_class("label", log.clone());
    let wide_log = log.clone();
    let wide = ViewClass::new("label", move || {
        Box::new(RecordingView::new("wide", wide_log.clone())) as Box<dyn NativeView>
    });
    let mut pools = ViewPoolMap::new();

    let label_key = PoolKey::new(ProducerClass::of::<Card>(), &ViewConfiguration::new(label.clone()));
    let wide_key = PoolKey::new(ProducerClass::of::<Card>(), &ViewConfiguration::new(wide.clone()));
    let first = pools.view_for(label_key.clone(), &label, &root);
    pools.reset();
    let second = pools.view_for(wide_key.clone(), &wide, &root);

    assert_ne!(label_key, wide_key);
    assert!(!second.ptr_eq(&first));
    assert_eq!(second.downcast_with(|view: &RecordingView| view.class()), Some("wide"));
    assert_eq!(pools.view_count(), 2);
    assert_eq!(
        label_key,
        PoolKey::new(
            ProducerClass::of::<Card>(),
            &ViewConfiguration::new(recording_view_class("label", log))
        )
    );
}

#[test]
fn persistent_names_are_compared_exactly() {
    const TINT: ViewAttribute = ViewAttribute::persistent("tint");
    let class = recording_view_class("label", event_log());
    let styled = ViewConfiguration::new(class.clone()).with(STYLE, "bold");
    let tinted = ViewConfiguration::new(class.clone()).with(TINT, "red");
    let both = ViewConfiguration::new(class).with(TINT, "red").with(STYLE, "bold");

    let key = |config: &ViewConfiguration| PoolKey::new(ProducerClass::of::<Card>(), config);
    assert_ne!(key(&styled), key(&tinted));
    assert_ne!(key(&styled), key(&both));
    assert_eq!(key(&both).shape.names(), ["style", "tint"]);
}
