//! GraphQL documents sent to the Hasura endpoint.

pub const GROUP_BY_TOKEN: &str = r#"
query group_by_token($token: String!) {
  group(where: { token: { _eq: $token } }, limit: 1) {
    id
    name
    token
    created_at
  }
}
"#;

pub const INSERT_GROUP: &str = r#"
mutation insert_group($id: uuid!, $name: String!, $token: String!) {
  insert_group_one(object: { id: $id, name: $name, token: $token }) {
    id
    name
    token
    created_at
  }
}
"#;

pub const GET_PARTICIPANTS: &str = r#"
query participants($group_id: uuid!) {
  participants(
    where: { group_id: { _eq: $group_id } }
    order_by: [{ created_at: asc }, { name: asc }]
  ) {
    group_id
    name
    created_at
  }
}
"#;

pub const INSERT_PARTICIPANT: &str = r#"
mutation insert_participant($group_id: uuid!, $name: String!) {
  insert_participants_one(
    object: { group_id: $group_id, name: $name }
    on_conflict: { constraint: participants_pkey, update_columns: [] }
  ) {
    name
  }
}
"#;

pub const DELETE_PARTICIPANT: &str = r#"
mutation delete_participant($group_id: uuid!, $name: String!) {
  delete_participants(where: { group_id: { _eq: $group_id }, name: { _eq: $name } }) {
    affected_rows
  }
}
"#;

pub const GET_ITINERARIES_BY_GROUP: &str = r#"
query itineraries_by_group($group_id: uuid!) {
  itineraries(where: { group_id: { _eq: $group_id } }, order_by: [{ start_date: asc }, { id: asc }]) {
    created_by
    destination
    end_date
    group_id
    id
    location_type
    start_date
    title
    travel_purpose
    updated_at
    total_budget
  }
}
"#;

pub const GET_ITINERARY_BY_ID: &str = r#"
query itinerary_by_pk($id: Int!) {
  itineraries_by_pk(id: $id) {
    created_by
    destination
    end_date
    group_id
    id
    location_type
    start_date
    title
    travel_purpose
    updated_at
    total_budget
  }
}
"#;

pub const INSERT_ITINERARY: &str = r#"
mutation insert_itinerary(
  $group_id: uuid!
  $title: String!
  $destination: String
  $start_date: date!
  $end_date: date!
  $travel_purpose: String
  $location_type: String
  $total_budget: numeric
  $created_by: String
) {
  insert_itineraries_one(
    object: {
      group_id: $group_id
      title: $title
      destination: $destination
      start_date: $start_date
      end_date: $end_date
      travel_purpose: $travel_purpose
      location_type: $location_type
      total_budget: $total_budget
      created_by: $created_by
    }
  ) {
    created_by
    destination
    end_date
    group_id
    id
    location_type
    start_date
    title
    travel_purpose
    updated_at
    total_budget
  }
}
"#;

pub const UPDATE_ITINERARY_BUDGET: &str = r#"
mutation update_itinerary_budget($id: Int!, $total_budget: numeric) {
  update_itineraries_by_pk(pk_columns: { id: $id }, _set: { total_budget: $total_budget }) {
    created_by
    destination
    end_date
    group_id
    id
    location_type
    start_date
    title
    travel_purpose
    updated_at
    total_budget
  }
}
"#;

pub const GET_ACTIVITIES: &str = r#"
query activities($itinerary_id: Int!) {
  activities(where: { itinerary_id: { _eq: $itinerary_id } }, order_by: [{ date: asc }, { time: asc }, { id: asc }]) {
    id
    itinerary_id
    name
    location
    notes
    type
    date
    time
    photo_url
    lat
    lng
    place_id
  }
}
"#;

pub const GET_ACTIVITIES_BY_DATE: &str = r#"
query activities_by_date($itinerary_id: Int!, $date: date!) {
  activities(
    where: { itinerary_id: { _eq: $itinerary_id }, date: { _eq: $date } }
    order_by: [{ time: asc }, { id: asc }]
  ) {
    id
    itinerary_id
    name
    location
    notes
    type
    date
    time
    photo_url
    lat
    lng
    place_id
  }
}
"#;

pub const INSERT_ACTIVITY: &str = r#"
mutation insert_activity(
  $itinerary_id: Int!
  $name: String!
  $location: String!
  $notes: String
  $type: String!
  $date: date!
  $time: time!
  $photo_url: String
  $lat: numeric
  $lng: numeric
  $place_id: String
) {
  insert_activities_one(
    object: {
      itinerary_id: $itinerary_id
      name: $name
      location: $location
      notes: $notes
      type: $type
      date: $date
      time: $time
      photo_url: $photo_url
      lat: $lat
      lng: $lng
      place_id: $place_id
    }
  ) {
    id
    itinerary_id
    name
    location
    notes
    type
    date
    time
    photo_url
    lat
    lng
    place_id
  }
}
"#;

pub const UPDATE_ACTIVITY: &str = r#"
mutation update_activity(
  $id: Int!
  $name: String!
  $location: String!
  $notes: String
  $type: String!
  $date: date!
  $time: time!
  $photo_url: String
  $lat: numeric
  $lng: numeric
  $place_id: String
) {
  update_activities_by_pk(
    pk_columns: { id: $id }
    _set: {
      name: $name
      location: $location
      notes: $notes
      type: $type
      date: $date
      time: $time
      photo_url: $photo_url
      lat: $lat
      lng: $lng
      place_id: $place_id
    }
  ) {
    id
    itinerary_id
    name
    location
    notes
    type
    date
    time
    photo_url
    lat
    lng
    place_id
  }
}
"#;

pub const DELETE_ACTIVITY: &str = r#"
mutation delete_activity($id: Int!) {
  delete_activities_by_pk(id: $id) {
    id
  }
}
"#;

pub const GET_BUDGETS: &str = r#"
query budgets($itinerary_id: Int!) {
  budgets(
    where: { itinerary_id: { _eq: $itinerary_id } }
    order_by: [{ date: asc }, { created_at: desc }, { id: desc }]
  ) {
    id
    itinerary_id
    date
    activity_id
    category
    amount
    description
    currency
    paid_by
    created_at
    activity {
      id
      name
      type
    }
  }
}
"#;

pub const INSERT_BUDGET: &str = r#"
mutation insert_budget(
  $itinerary_id: Int!
  $date: date!
  $activity_id: Int
  $category: String!
  $amount: numeric!
  $description: String
  $currency: String!
  $paid_by: String
) {
  insert_budgets_one(
    object: {
      itinerary_id: $itinerary_id
      date: $date
      activity_id: $activity_id
      category: $category
      amount: $amount
      description: $description
      currency: $currency
      paid_by: $paid_by
    }
  ) {
    id
    itinerary_id
    date
    activity_id
    category
    amount
    description
    currency
    paid_by
    created_at
    activity {
      id
      name
      type
    }
  }
}
"#;

pub const UPDATE_BUDGET: &str = r#"
mutation update_budget(
  $id: Int!
  $date: date!
  $activity_id: Int
  $category: String!
  $amount: numeric!
  $description: String
  $currency: String!
  $paid_by: String
) {
  update_budgets_by_pk(
    pk_columns: { id: $id }
    _set: {
      date: $date
      activity_id: $activity_id
      category: $category
      amount: $amount
      description: $description
      currency: $currency
      paid_by: $paid_by
    }
  ) {
    id
    itinerary_id
    date
    activity_id
    category
    amount
    description
    currency
    paid_by
    created_at
    activity {
      id
      name
      type
    }
  }
}
"#;

pub const DELETE_BUDGET: &str = r#"
mutation delete_budget($id: Int!) {
  delete_budgets_by_pk(id: $id) {
    id
  }
}
"#;
