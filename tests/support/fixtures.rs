//! YAML projects and fragments used across the CLI tests.

pub const MOODBOT_DOMAIN: &str = r#"version: "3.1"

intents:
  - greet
  - goodbye
  - affirm
  - deny
  - mood_great
  - mood_unhappy
  - bot_challenge

responses:
  utter_greet:
  - text: "Hey! How are you?"

  utter_cheer_up:
  - text: "Here is something to cheer you up:"
    image: "https://i.imgur.com/nGF1K8f.jpg"

  utter_did_that_help:
  - text: "Did that help you?"

  utter_happy:
  - text: "Great, carry on!"

  utter_goodbye:
  - text: "Bye"

  utter_iamabot:
  - text: "I am a bot, powered by Rasa."

session_config:
  session_expiration_time: 60
  carry_over_slots_to_new_session: true
"#;

pub const MOODBOT_NLU: &str = r#"version: "3.1"

nlu:
- intent: greet
  examples: |
    - hey
    - hello
    - hi
    - good morning
    - hey there

- intent: goodbye
  examples: |
    - bye
    - goodbye
    - see you later

- intent: affirm
  examples: |
    - yes
    - indeed
    - of course
    - correct

- intent: deny
  examples: |
    - no
    - never
    - not really

- intent: mood_great
  examples: |
    - perfect
    - amazing
    - I am feeling very good
    - so good

- intent: mood_unhappy
  examples: |
    - my day was horrible
    - I am sad
    - I don't feel very well
    - very sad

- intent: bot_challenge
  examples: |
    - are you a bot?
    - am I talking to a human?
"#;

pub const MOODBOT_STORIES: &str = r#"version: "3.1"

stories:

- story: happy path
  steps:
  - intent: greet
  - action: utter_greet
  - intent: mood_great
  - action: utter_happy

- story: sad path 1
  steps:
  - intent: greet
  - action: utter_greet
  - intent: mood_unhappy
  - action: utter_cheer_up
  - action: utter_did_that_help
  - intent: affirm
  - action: utter_happy

- story: sad path 2
  steps:
  - intent: greet
  - action: utter_greet
  - intent: mood_unhappy
  - action: utter_cheer_up
  - action: utter_did_that_help
  - intent: deny
  - action: utter_goodbye
"#;

pub const MOODBOT_RULES: &str = r#"version: "3.1"

rules:

- rule: Say goodbye anytime the user says goodbye
  steps:
  - intent: goodbye
  - action: utter_goodbye

- rule: Say 'I am a bot' anytime the user challenges
  steps:
  - intent: bot_challenge
  - action: utter_iamabot
"#;

pub const CONFIG_UNIQUE_ASSISTANT_ID: &str = r#"recipe: default.v1
assistant_id: mood_bot_2023
language: en
policies:
  - name: MemoizationPolicy
  - name: RulePolicy
  - name: TEDPolicy
    max_history: 5
    epochs: 100
"#;

pub const CONFIG_PLACEHOLDER_ASSISTANT_ID: &str = r#"recipe: default.v1
assistant_id: placeholder_default
language: en
policies:
  - name: RulePolicy
"#;

pub const CONFIG_NO_ASSISTANT_ID: &str = r#"recipe: default.v1
language: en
policies:
  - name: RulePolicy
"#;

pub const RESTAURANT_DOMAIN: &str = r#"version: "3.1"

intents:
  - request_restaurant
  - affirm

entities:
  - cuisine

slots:
  cuisine:
    type: text
    mappings:
    - type: from_entity
      entity: cuisine

responses:
  utter_ask_cuisine:
  - text: "What cuisine?"

actions:
  - action_search_restaurants
"#;

pub const RESTAURANT_DOMAIN_WITH_FORM: &str = r#"version: "3.1"

intents:
  - request_restaurant

entities:
  - cuisine

slots:
  cuisine:
    type: text
    mappings:
    - type: from_entity
      entity: cuisine

forms:
  restaurant_form:
    required_slots:
    - cuisine

responses:
  utter_ask_cuisine:
  - text: "What cuisine?"

actions:
  - action_search_restaurants
"#;

pub const RESTAURANT_NLU: &str = r#"version: "3.1"

nlu:
- intent: request_restaurant
  examples: |
    - im looking for a restaurant
    - can i get [swedish](cuisine) food in any area
    - a restaurant that serves [caribbean](cuisine) food
"#;

pub const FORM_SLOTS_NOT_MATCHING_DOMAIN: &str = r#"version: "3.1"
forms:
  name_form:
    required_slots:
    - first_name
    - last_name
slots:
  first_name:
    type: text
    mappings:
    - type: from_text
  last_nam:
    type: text
    mappings:
    - type: from_text
"#;

pub const DUPLICATE_INTENTS_DOMAIN: &str = r#"version: "3.1"
intents:
  - greet
  - goodbye
  - greet
responses:
  utter_greet:
  - text: "hi"
"#;

pub const INVALID_SLOT_MAPPINGS_DOMAIN: &str = r#"version: "3.1"
intents:
- state_length_of_time
entities:
- city
slots:
  duration:
    type: text
    influence_conversation: false
    mappings:
    - type: from_text
      intent: state_length_of_time
      conditions:
      - active_loop: booking_form
  location:
    type: text
    mappings:
    - type: from_entity
      entity: city
forms:
  booking_form:
    required_slots:
    - location
"#;

pub const TRIGGERS_DOMAIN: &str = r#"version: "3.1"
intents:
  - greet:
      triggers: utter_greet
responses:
  utter_greet:
  - text: "hi"
"#;

pub const LEGACY_DOMAIN: &str = r#"version: "2.0"
intents:
  - request_restaurant
entities:
  - cuisine
slots:
  cuisine:
    type: text
  outdoor:
    type: bool
forms:
  restaurant_form:
    required_slots:
      cuisine:
      - type: from_entity
        entity: cuisine
      outdoor:
      - type: from_intent
        intent: affirm
        value: true
"#;

pub const RETRIEVAL_NLU_WITH_ENTITIES: &str = r#"version: "3.1"

nlu:
- intent: greet
  examples: |
    - hey
    - hello there
- intent: inform
  examples: |
    - I live in [NYC](city:New York City)
    - [Berlin](city) please
- synonym: New York City
  examples: |
    - NYC
    - the big apple
- regex: zipcode
  examples: |
    - [0-9]{5}
- lookup: city
  examples: |
    - Berlin
    - Paris
"#;
