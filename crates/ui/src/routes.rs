use dioxus::prelude::*;
use dioxus_router::{Outlet, Routable};

use crate::views::CourseView;

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", CourseView)] Course {},
}

#[component]
fn Layout() -> Element {
    let mut dark_mode = use_signal(|| true);
    let mut menu_open = use_signal(|| false);
    let theme = if dark_mode() { "app dark" } else { "app" };

    rsx! {
        div { class: "{theme}",
            nav { class: "navbar",
                h1 { "E-Learn" }
                div { class: "navbar__actions",
                    button {
                        r#type: "button",
                        onclick: move |_| dark_mode.toggle(),
                        "Toggle Theme"
                    }
                }
                button {
                    class: "navbar__menu-toggle",
                    r#type: "button",
                    onclick: move |_| menu_open.toggle(),
                    "Menu"
                }
            }
            if menu_open() {
                div { class: "navbar__menu",
                    button {
                        r#type: "button",
                        onclick: move |_| dark_mode.toggle(),
                        "Toggle Theme"
                    }
                }
            }
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}
