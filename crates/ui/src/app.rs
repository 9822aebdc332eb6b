use dioxus::prelude::*;
use dioxus_router::Router;

use crate::routes::Route;

const STYLE: &str = include_str!("../assets/style.css");

#[component]
pub fn App() -> Element {
    rsx! {
        style { "{STYLE}" }

        document::Title { "E-Learn" }

        div { class: "app-root",
            ErrorBoundary {
                handle_error: |errors: ErrorContext| rsx! {
                    div { class: "fatal",
                        h1 { "Something went wrong" }
                        pre { "{errors:?}" }
                    }
                },
                Router::<Route> {}
            }
        }
    }
}
