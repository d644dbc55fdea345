use super::*;
use crate::ui::form::FormKey;
use crate::ui::FormRegistry;
use futures::executor::{block_on, LocalPool};
use crate::form_descriptor;
use async_trait::async_trait;
use futures::task::LocalSpawnExt;

/// Plain window used only by the lookup ordering test
struct Late {
    core: FormCore,
}

/// Plain window used only by the lookup ordering test
struct Early {
    core: FormCore,
}

macro_rules! plain_window {
    ($form:ident) => {
        #[async_trait(?Send)]
        impl UiForm for $form {
            type Params = ();
            type Output = ();

            fn core(&self) -> &FormCore {
                &self.core
            }

            fn core_mut(&mut self) -> &mut FormCore {
                &mut self.core
            }
        }

        impl FormType for $form {
            form_descriptor!();

            fn create(_ctx: &UiContext) -> Self {
                Self {
                    core: FormCore::new(DisplayKind::Window),
                }
            }
        }
    };
}

plain_window!(Late);
plain_window!(Early);

#[test]
fn test_default_path_is_memoized() {
    let h = Harness::new();
    assert_eq!(Dialog::prefab_path(&h.ctx), "ui/Dialog");
    assert_eq!(Hud::prefab_path(&h.ctx), "hud/Main");

    h.ctx.config_mut().ui_path_root = "screens/".to_string();
    assert_eq!(Dialog::prefab_path(&h.ctx), "ui/Dialog");
    assert_eq!(Dialog::descriptor().resolved(), Some("ui/Dialog"));
}

#[test]
fn test_open_existing_form_returns_same_instance() {
    let h = Harness::new();
    block_on(async {
        let first = Hud::open_view(&h.ctx, ()).await.unwrap();
        let second = Hud::open_view(&h.ctx, ()).await.unwrap();
        assert!(Rc::ptr_eq(&first, &second));
    });
    assert_eq!(hook_calls().shows.get(), 1);
    assert_eq!(h.manager.open_count(), 1);
}

#[test]
fn test_nested_show_and_close() {
    let h = Harness::new();
    block_on(async {
        let hud = Hud::open_view(&h.ctx, ()).await.unwrap();
        let opening = hud.borrow().show_ui_form(&h.ctx, "Dialog", "Nested".to_string());
        let form = opening.await.unwrap();

        let dialog = form.downcast::<Dialog>().unwrap();
        assert_eq!(dialog.borrow().message, "Nested");
        assert!(h.manager.is_open("ui/Dialog"));

        let closing = dialog.borrow().close_ui_form(&h.ctx);
        assert!(closing.await.unwrap());
        assert!(!h.manager.is_open("ui/Dialog"));
        assert!(h.manager.is_open("hud/Main"));
    });
}

#[test]
fn test_unattached_form_close_is_noop() {
    let h = Harness::new();
    let dialog = Dialog::create(&h.ctx);
    assert!(!block_on(dialog.close_ui_form(&h.ctx)).unwrap());
}

#[test]
fn test_wrong_params_leave_nothing_behind() {
    let h = Harness::new();
    let hud = block_on(Hud::open_view(&h.ctx, ())).unwrap();
    let opening = hud.borrow().show_ui_form(&h.ctx, "Dialog", 42_u32);
    let result = block_on(opening);

    assert!(matches!(result, Err(FormError::ParamsMismatch { .. })));
    assert!(h.root_child("ui/Dialog").is_none());
    assert!(!h.ctx.resources().is_loaded("ui/Dialog"));
    assert_eq!(h.manager.open_count(), 1);
}

#[test]
fn test_unknown_form_is_not_registered() {
    let h = Harness::new();
    let result = block_on(h.manager.open(&h.ctx, "ui/Nope", Box::new(())));
    assert!(matches!(result, Err(FormError::NotRegistered(ref path)) if path == "ui/Nope"));
}

#[test]
fn test_open_while_in_flight_is_busy() {
    let (h, tweens) = Harness::with_tweens();
    let mut pool = LocalPool::new();
    {
        let ctx = h.ctx.clone();
        pool.spawner()
            .spawn_local(async move {
                Dialog::open_view(&ctx, "First".to_string()).await.unwrap();
            })
            .unwrap();
    }
    pool.run_until_stalled();

    let second = block_on(Dialog::open_view(&h.ctx, "Second".to_string()));
    assert!(matches!(second, Err(FormError::Busy(_))));

    tweens.update(0.3);
    pool.run_until_stalled();
    assert!(h.manager.is_open("ui/Dialog"));
    assert_eq!(hook_calls().loads.get(), 1);
}

#[test]
fn test_close_by_id() {
    let h = Harness::new();
    block_on(async {
        let hud = Hud::open_view(&h.ctx, ()).await.unwrap();
        let id = hud.borrow().core().id().unwrap();
        assert!(h.manager.close(&h.ctx, FormKey::Id(id)).await.unwrap());
        assert!(!h.manager.close(&h.ctx, FormKey::Id(id)).await.unwrap());
    });
    assert_eq!(h.manager.cached_count(), 1);
}

#[test]
fn test_close_all_and_clear_cache() {
    let h = Harness::new();
    block_on(async {
        Hud::open_view(&h.ctx, ()).await.unwrap();
        Dialog::open_view(&h.ctx, "Bye".to_string()).await.unwrap();
        assert_eq!(h.manager.close_all(&h.ctx).await.unwrap(), 2);
    });

    assert_eq!(h.manager.open_count(), 0);
    assert_eq!(h.manager.cached_count(), 1);
    assert_eq!(h.manager.clear_cache(&h.ctx), 1);
    assert_eq!(h.ctx.resources().loaded_count(), 0);
    assert_eq!(h.ctx.scene().len(), 1);
}

#[test]
fn test_lookup_resolves_only_the_matched_form() {
    let h = Harness::new();
    h.manager.register::<Late>();
    h.manager.register::<Early>();

    block_on(Early::open_view(&h.ctx, ())).unwrap();
    assert_eq!(Early::descriptor().resolved(), Some("ui/Early"));
    assert_eq!(Late::descriptor().resolved(), None);

    h.ctx.config_mut().ui_path_root = "screens/".to_string();
    block_on(Late::open_view(&h.ctx, ())).unwrap();

    assert_eq!(Late::prefab_path(&h.ctx), "screens/Late");
    assert!(h.manager.is_open("screens/Late"));
    assert!(h.manager.is_open("ui/Early"));
    assert!(block_on(h.manager.close(&h.ctx, FormKey::Path("Late"))).unwrap());
}
