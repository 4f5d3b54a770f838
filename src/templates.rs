use maud::{DOCTYPE, Markup, html};

use crate::models::{Movie, MovieInput};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const INPUT_CLASS: &str = "mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";
const BUTTON_CLASS: &str =
    "rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700";
const LINK_CLASS: &str = "text-sm text-blue-600 hover:text-blue-800";

/// Which form is being drawn: a blank one for a new movie or one bound to an existing id.
#[derive(Clone, Copy, Debug)]
pub enum FormTarget {
    New,
    Edit(i64),
}

/// HTML page renderer. Built once by `main` and shared through the app state.
#[derive(Clone, Debug)]
pub struct Renderer {
    site_title: String,
}

impl Renderer {
    pub fn new(site_title: impl Into<String>) -> Self {
        Self { site_title: site_title.into() }
    }

    pub fn home_page(&self) -> String {
        self.page(
            "Home",
            html! {
                h1 class="text-3xl font-bold text-gray-900" { (self.site_title) }
                p class="mt-2 text-gray-600" { "Keep track of movies and their catalog references." }
                div class="mt-8 flex gap-4" {
                    a class=(BUTTON_CLASS) href="/movies" { "Browse movies" }
                    a class=(LINK_CLASS) href="/movies/new" { "Add a movie" }
                }
            },
        )
    }

    pub fn movie_list(&self, movies: &[Movie]) -> String {
        self.page(
            "All movies",
            html! {
                div class="flex items-start justify-between gap-6" {
                    h1 class="text-3xl font-bold text-gray-900" { "Movies" }
                    a class=(BUTTON_CLASS) href="/movies/new" { "New movie" }
                }

                @if movies.is_empty() {
                    p class="mt-8 text-gray-600" { "No movies yet." }
                } @else {
                    ul class="mt-8 divide-y divide-gray-200" {
                        @for movie in movies {
                            li class="py-3 flex items-center justify-between" {
                                a class="font-medium text-gray-900 hover:text-blue-700" href=(show_path(movie.id)) {
                                    (movie.title)
                                }
                                span class="text-sm text-gray-500" { (movie.external_reference) }
                            }
                        }
                    }
                }
            },
        )
    }

    pub fn movie_detail(&self, movie: &Movie) -> String {
        self.page(
            &movie.title,
            html! {
                h1 class="text-3xl font-bold text-gray-900" { (movie.title) }
                dl class="mt-6 grid grid-cols-3 gap-y-2 text-sm" {
                    dt class="font-medium text-gray-700" { "External reference" }
                    dd class="col-span-2 text-gray-900" { (movie.external_reference) }
                    dt class="font-medium text-gray-700" { "Added" }
                    dd class="col-span-2 text-gray-900" { (format_timestamp(movie.created_at)) }
                    dt class="font-medium text-gray-700" { "Last updated" }
                    dd class="col-span-2 text-gray-900" { (format_timestamp(movie.updated_at)) }
                }

                div class="mt-8 flex items-center gap-4" {
                    a class=(BUTTON_CLASS) href=(format!("/movies/{}/edit", movie.id)) { "Edit" }
                    form method="post" action=(format!("/movies/{}/delete", movie.id)) {
                        button class="rounded-md bg-red-600 px-4 py-2 font-semibold text-white hover:bg-red-700" type="submit" { "Delete" }
                    }
                    a class=(LINK_CLASS) href="/movies" { "Back to list" }
                }
            },
        )
    }

    /// Form page for creating or editing. `error` is shown above the fields when set.
    pub fn movie_form(&self, target: FormTarget, values: &MovieInput, error: Option<&str>) -> String {
        let (heading, action, cancel) = match target {
            FormTarget::New => ("New movie", "/movies".to_string(), "/movies".to_string()),
            FormTarget::Edit(id) => ("Edit movie", show_path(id), show_path(id)),
        };

        self.page(
            heading,
            html! {
                h1 class="text-3xl font-bold text-gray-900" { (heading) }

                @if let Some(error) = error {
                    p class="mt-4 rounded-md bg-red-50 px-4 py-3 text-sm text-red-700" { (error) }
                }

                form class="mt-8 space-y-6" method="post" action=(action) {
                    div {
                        label class="block text-sm font-medium text-gray-700" for="title" { "Title" }
                        input class=(INPUT_CLASS) name="title" id="title" value=(values.title) required;
                    }
                    div {
                        label class="block text-sm font-medium text-gray-700" for="external_reference" { "External reference" }
                        input class=(INPUT_CLASS) name="external_reference" id="external_reference" value=(values.external_reference) required;
                        p class="mt-2 text-xs text-gray-500" { "Catalog identifier, e.g. tt1375666." }
                    }
                    div class="flex items-center gap-4" {
                        button class=(BUTTON_CLASS) type="submit" { "Save" }
                        a class=(LINK_CLASS) href=(cancel) { "Cancel" }
                    }
                }
            },
        )
    }

    pub fn error_page(&self, status: u16, message: &str) -> String {
        self.page(
            "Error",
            html! {
                h1 class="text-2xl font-bold text-gray-900" { "Error " (status) }
                p class="mt-4 text-gray-700" { (message) }
                a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/movies" { "Back" }
            },
        )
    }

    fn page(&self, title: &str, body: Markup) -> String {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    title { (title) " · " (self.site_title) }
                    script src=(TAILWIND_CDN) {}
                }
                body {
                    div class="min-h-screen bg-gray-50" {
                        div class="max-w-2xl mx-auto px-6 py-12" {
                            div class="bg-white shadow rounded-lg p-8" { (body) }
                        }
                    }
                }
            }
        }
        .into_string()
    }
}

fn format_timestamp(ts: jiff::Timestamp) -> String {
    ts.strftime("%Y-%m-%d %H:%M UTC").to_string()
}

pub fn show_path(id: i64) -> String {
    format!("/movies/{id}")
}
