use autoreply_core::{
    AutoresponderConfig, AutoresponderForm, AutoresponderRecord, ErrorExt, FormCommand,
    FormEffect, NoticeKind, OwnerId, SelectedPost, SubmissionController, DM_MESSAGE_SOFT_LIMIT,
};
use iced::widget::{button, column, container, row, scrollable, text, text_input, Column, Row};
use iced::{window, Color, Command, Element, Length, Theme};
use tracing::{debug, info};

const ERROR_COLOR: Color = Color {
    r: 0.80,
    g: 0.20,
    b: 0.20,
    a: 1.0,
};
const SUCCESS_COLOR: Color = Color {
    r: 0.15,
    g: 0.60,
    b: 0.30,
    a: 1.0,
};
const MUTED_COLOR: Color = Color {
    r: 0.45,
    g: 0.45,
    b: 0.45,
    a: 1.0,
};

#[derive(Debug, Clone)]
pub enum Message {
    NameChanged(String),
    KeywordInputChanged(String),
    AddKeyword,
    RemoveKeyword(usize),
    MessageChanged(String),
    Submit,
    IdentityResolved(OwnerId),
    Persisted(Result<AutoresponderRecord, String>),
    DismissNotice,
    Back,
}

/// Caller hooks for the two ways the form hands control back.
pub struct Handlers {
    pub on_complete: Box<dyn Fn(&AutoresponderConfig) + Send + Sync>,
    pub on_back: Box<dyn Fn() + Send + Sync>,
}

impl Default for Handlers {
    fn default() -> Self {
        Self {
            on_complete: Box::new(|config: &AutoresponderConfig| {
                info!("Autoresponder '{}' configured", config.name);
            }),
            on_back: Box::new(|| debug!("Leaving autoresponder form")),
        }
    }
}

pub struct App {
    form: AutoresponderForm,
    controller: SubmissionController,
    handlers: Handlers,
}

impl App {
    pub fn new(post: SelectedPost, controller: SubmissionController, handlers: Handlers) -> Self {
        Self {
            form: AutoresponderForm::new(post),
            controller,
            handlers,
        }
    }

    pub fn form(&self) -> &AutoresponderForm {
        &self.form
    }

    pub fn update(&mut self, message: Message) -> Command<Message> {
        let command = match message {
            Message::NameChanged(name) => FormCommand::SetName(name),
            Message::KeywordInputChanged(input) => FormCommand::SetKeywordInput(input),
            Message::AddKeyword => FormCommand::AddKeyword,
            Message::RemoveKeyword(index) => FormCommand::RemoveKeyword(index),
            Message::MessageChanged(message) => FormCommand::SetMessage(message),
            Message::Submit => FormCommand::Submit,
            Message::IdentityResolved(owner) => FormCommand::IdentityResolved(owner),
            Message::Persisted(Ok(record)) => FormCommand::PersistSucceeded(record),
            Message::Persisted(Err(reason)) => FormCommand::PersistFailed(reason),
            Message::DismissNotice => FormCommand::DismissNotice,
            Message::Back => FormCommand::Back,
        };

        match self.form.update(command) {
            FormEffect::None | FormEffect::Rejected(_) => Command::none(),
            FormEffect::ResolveIdentity => {
                let controller = self.controller.clone();
                Command::perform(
                    async move { controller.resolve_identity().await },
                    Message::IdentityResolved,
                )
            }
            FormEffect::Persist(row) => {
                let controller = self.controller.clone();
                Command::perform(
                    async move {
                        controller
                            .persist(row)
                            .await
                            .map_err(|e| e.user_friendly_message())
                    },
                    Message::Persisted,
                )
            }
            FormEffect::Completed(config) => {
                (self.handlers.on_complete)(&config);
                Command::none()
            }
            FormEffect::Back => {
                (self.handlers.on_back)();
                window::close(window::Id::MAIN)
            }
        }
    }

    pub fn view(&self) -> Element<Message, Theme> {
        let submitting = self.form.is_submitting();

        let mut back = button("Back");
        if !submitting {
            back = back.on_press(Message::Back);
        }
        let header: Element<Message, Theme> = row![back, text("New autoresponder").size(24)]
            .spacing(10)
            .into();

        let content: Element<Message, Theme> = column![
            self.post_summary(),
            self.name_section(submitting),
            self.keyword_section(submitting),
            self.message_section(submitting),
            self.submit_section(submitting),
        ]
        .spacing(20)
        .into();

        let mut main_content = Column::new().spacing(20).push(header);
        if let Some(notice) = self.notice_view() {
            main_content = main_content.push(notice);
        }
        main_content = main_content.push(scrollable(container(content).padding(10)));

        container(main_content)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(20)
            .into()
    }

    fn post_summary(&self) -> Element<Message, Theme> {
        let post = self.form.post();
        let mut summary = column![
            text("Selected post").size(16),
            text(post.caption.as_deref().unwrap_or("No caption")).size(14),
            text(&post.permalink).size(12).style(MUTED_COLOR),
        ]
        .spacing(4);

        if let Some(preview) = post.preview_url() {
            summary = summary.push(text(format!("Media: {}", preview)).size(12).style(MUTED_COLOR));
        }
        summary.into()
    }

    fn name_section(&self, submitting: bool) -> Element<Message, Theme> {
        let mut input = text_input("e.g. Spring sale link", self.form.name()).padding(8);
        if !submitting {
            input = input.on_input(Message::NameChanged);
        }
        column![text("Autoresponder name").size(16), input]
            .spacing(6)
            .into()
    }

    fn keyword_section(&self, submitting: bool) -> Element<Message, Theme> {
        let mut input = text_input("Type a keyword and press Enter", self.form.keyword_input())
            .padding(8);
        let mut add = button("Add");
        if !submitting {
            input = input
                .on_input(Message::KeywordInputChanged)
                .on_submit(Message::AddKeyword);
            add = add.on_press(Message::AddKeyword);
        }

        let mut chips = Row::new().spacing(8);
        for (index, keyword) in self.form.keywords().iter().enumerate() {
            let mut remove = button("x").padding(2);
            if !submitting {
                remove = remove.on_press(Message::RemoveKeyword(index));
            }
            chips = chips.push(
                container(row![text(keyword).size(14), remove].spacing(4)).padding(4),
            );
        }

        let hint: Element<Message, Theme> = if self.form.keywords().is_empty() {
            text("Comments containing any keyword trigger the DM")
                .size(12)
                .style(MUTED_COLOR)
                .into()
        } else {
            chips.into()
        };

        column![
            text("Trigger keywords").size(16),
            row![input, add].spacing(8),
            hint
        ]
        .spacing(6)
        .into()
    }

    fn message_section(&self, submitting: bool) -> Element<Message, Theme> {
        let mut input =
            text_input("Message sent by DM to the commenter", self.form.dm_message()).padding(8);
        if !submitting {
            input = input.on_input(Message::MessageChanged);
        }

        let color = if self.form.is_message_over_limit() {
            ERROR_COLOR
        } else {
            MUTED_COLOR
        };
        let counter = text(format!(
            "{}/{}",
            self.form.message_char_count(),
            DM_MESSAGE_SOFT_LIMIT
        ))
        .size(12)
        .style(color);

        column![text("Direct message").size(16), input, counter]
            .spacing(6)
            .into()
    }

    fn submit_section(&self, submitting: bool) -> Element<Message, Theme> {
        let label = if submitting {
            "Saving..."
        } else {
            "Create autoresponder"
        };
        let mut submit = button(label).padding(10);
        if !submitting {
            submit = submit.on_press(Message::Submit);
        }
        submit.into()
    }

    fn notice_view(&self) -> Option<Element<Message, Theme>> {
        let notice = self.form.notice()?;
        let color = match notice.kind {
            NoticeKind::Success => SUCCESS_COLOR,
            NoticeKind::Error => ERROR_COLOR,
        };
        Some(
            row![
                text(&notice.text).size(14).style(color),
                button("Dismiss").on_press(Message::DismissNotice)
            ]
            .spacing(10)
            .into(),
        )
    }
}
