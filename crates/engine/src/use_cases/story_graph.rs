//! Interactive story graph use cases: nodes, choices and the structure view.
//!
//! Two sequences here are not atomic. Setting a start node clears the old
//! one in a separate write, and choice creation checks for a duplicate
//! endpoint pair before inserting. Concurrent editors can race either.

use std::sync::Arc;

use inkworld_domain::{
    Choice, ChoiceId, ChoiceWithEndpoints, NodeId, NodeType, NodeWithChoices, StoryGraph, StoryId,
    StoryNode, StoryStructure, UserId,
};
use inkworld_shared::{CreateChoiceRequest, CreateNodeRequest, UpdateChoiceRequest};

use crate::infrastructure::ports::{ChoiceRepo, ClockPort, NodeRepo, RepoError, StoryRepo};
use crate::use_cases::authorization::{AccessError, StoryAccess};

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Story or choice missing, or not the caller's
    #[error("Not found")]
    NotFound,
    /// A choice endpoint is not a node of the story
    #[error("Node not found")]
    NodeNotFound,
    #[error("This connection already exists")]
    DuplicateConnection,
    #[error("Story is already interactive")]
    AlreadyInteractive,
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl From<AccessError> for GraphError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotFound => GraphError::NotFound,
            AccessError::Repo(e) => GraphError::Repo(e),
        }
    }
}

pub struct GraphOps {
    stories: Arc<dyn StoryRepo>,
    nodes: Arc<dyn NodeRepo>,
    choices: Arc<dyn ChoiceRepo>,
    access: Arc<StoryAccess>,
    clock: Arc<dyn ClockPort>,
}

impl GraphOps {
    pub fn new(
        stories: Arc<dyn StoryRepo>,
        nodes: Arc<dyn NodeRepo>,
        choices: Arc<dyn ChoiceRepo>,
        access: Arc<StoryAccess>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            stories,
            nodes,
            choices,
            access,
            clock,
        }
    }

    pub async fn create_node(
        &self,
        user_id: UserId,
        story_id: StoryId,
        data: CreateNodeRequest,
    ) -> Result<NodeWithChoices, GraphError> {
        let mut story = self.access.owned_story(user_id, story_id).await?;
        let now = self.clock.now();

        let mut node = StoryNode::new(story.id, data.title, data.content, data.node_type, now)
            .with_ending(data.is_ending || data.node_type == NodeType::Ending)
            .at_position(data.position);
        if data.is_start {
            self.nodes.clear_start(story.id, now).await?;
            node = node.as_start();
        }
        self.nodes.save(&node).await?;

        if !story.is_interactive {
            story.mark_interactive(now);
            self.stories.save(&story).await?;
        }

        tracing::debug!(story_id = %story.id, node_id = %node.id, "Created story node");
        Ok(NodeWithChoices {
            node,
            choices: Vec::new(),
        })
    }

    pub async fn list_nodes(
        &self,
        user_id: UserId,
        story_id: StoryId,
    ) -> Result<Vec<NodeWithChoices>, GraphError> {
        let story = self.access.owned_story(user_id, story_id).await?;
        Ok(self.load_graph(story.id).await?.into_node_list())
    }

    pub async fn create_choice(
        &self,
        user_id: UserId,
        story_id: StoryId,
        data: CreateChoiceRequest,
    ) -> Result<ChoiceWithEndpoints, GraphError> {
        let story = self.access.owned_story(user_id, story_id).await?;
        let from_node = self.node_in_story(story.id, &data.from_node_id).await?;
        let to_node = self.node_in_story(story.id, &data.to_node_id).await?;

        if self.choices.exists_between(from_node.id, to_node.id).await? {
            return Err(GraphError::DuplicateConnection);
        }

        let choice = Choice::new(from_node.id, to_node.id, data.text, self.clock.now())
            .with_emoji(data.emoji)
            .at_position(data.position);
        self.choices.save(&choice).await?;

        Ok(ChoiceWithEndpoints {
            choice,
            from_node: from_node.summary(),
            to_node: to_node.summary(),
        })
    }

    pub async fn update_choice(
        &self,
        user_id: UserId,
        story_id: StoryId,
        choice_id: ChoiceId,
        data: UpdateChoiceRequest,
    ) -> Result<Choice, GraphError> {
        let owned = self.access.owned_choice(user_id, story_id, choice_id).await?;
        let mut choice = owned.choice;

        if let Some(text) = data.text {
            choice.text = text;
        }
        if data.emoji.is_some() {
            choice = choice.with_emoji(data.emoji);
        }
        if let Some(position) = data.position {
            choice.position = position;
        }
        if let Some(to_node_id) = data.to_node_id {
            let target = self.node_in_story(story_id, &to_node_id).await?;
            if target.id != choice.to_node_id
                && self
                    .choices
                    .exists_between(choice.from_node_id, target.id)
                    .await?
            {
                return Err(GraphError::DuplicateConnection);
            }
            choice.to_node_id = target.id;
        }

        self.choices.save(&choice).await?;
        Ok(choice)
    }

    pub async fn delete_choice(
        &self,
        user_id: UserId,
        story_id: StoryId,
        choice_id: ChoiceId,
    ) -> Result<(), GraphError> {
        let owned = self.access.owned_choice(user_id, story_id, choice_id).await?;
        self.choices.delete(owned.choice.id).await?;
        Ok(())
    }

    /// Reader traffic; no session required.
    pub async fn record_choice_taken(&self, choice_id: ChoiceId) -> Result<(), GraphError> {
        if self.choices.increment_times_chosen(choice_id).await? {
            Ok(())
        } else {
            Err(GraphError::NotFound)
        }
    }

    /// Snapshot a linear story's content into a single start node.
    pub async fn convert_to_interactive(
        &self,
        user_id: UserId,
        story_id: StoryId,
    ) -> Result<StoryNode, GraphError> {
        let mut story = self.access.owned_story(user_id, story_id).await?;
        if story.is_interactive && self.nodes.count_for_story(story.id).await? > 0 {
            return Err(GraphError::AlreadyInteractive);
        }

        let now = self.clock.now();
        let node = StoryNode::new(
            story.id,
            story.title.clone(),
            story.content.clone(),
            NodeType::Content,
            now,
        )
        .at_position(0)
        .as_start();
        self.nodes.save(&node).await?;

        story.mark_interactive(now);
        self.stories.save(&story).await?;

        tracing::info!(story_id = %story.id, "Converted story to interactive");
        Ok(node)
    }

    /// Public for published stories, author-only otherwise.
    pub async fn structure(
        &self,
        viewer: Option<UserId>,
        story_id: StoryId,
    ) -> Result<StoryStructure, GraphError> {
        let story = self.access.readable_story(viewer, story_id).await?;
        Ok(self.load_graph(story.id).await?.into_structure())
    }

    async fn load_graph(&self, story_id: StoryId) -> Result<StoryGraph, GraphError> {
        let nodes = self.nodes.list_for_story(story_id).await?;
        let choices = self.choices.list_for_story(story_id).await?;
        Ok(StoryGraph::new(story_id, nodes, choices))
    }

    async fn node_in_story(&self, story_id: StoryId, raw_id: &str) -> Result<StoryNode, GraphError> {
        let node_id: NodeId = raw_id.parse().map_err(|_| GraphError::NodeNotFound)?;
        self.nodes
            .get(node_id)
            .await?
            .filter(|node| node.belongs_to(story_id))
            .ok_or(GraphError::NodeNotFound)
    }
}
